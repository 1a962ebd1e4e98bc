//! Command-line argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

/// xenserver-inspect - Inspect and adjust XenServer objects
#[derive(Parser, Debug)]
#[command(name = "xenserver-inspect")]
#[command(about = "xenserver-inspect - Inspect and adjust XenServer objects")]
#[command(version)]
pub struct Args {
    /// Path to configuration file (optional, defaults used if not found)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Pool master URL (e.g., https://xen-master.example.com)
    #[arg(long, env = "XENSERVER_URL")]
    pub url: Option<String>,

    /// Session reference from session.login_with_password
    #[arg(long, env = "XENSERVER_SESSION")]
    pub session: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load an object and print it as JSON
    Show {
        /// Object class
        #[arg(value_enum)]
        kind: ObjectKind,

        /// Name label (network, vm, sr and vdi only)
        #[arg(long, conflicts_with = "uuid")]
        name: Option<String>,

        /// UUID
        #[arg(long)]
        uuid: Option<String>,
    },

    /// Set the static and dynamic memory limits of a VM, in bytes
    SetMemory {
        #[arg(long)]
        uuid: String,
        #[arg(long)]
        static_min: i64,
        #[arg(long)]
        static_max: i64,
        #[arg(long)]
        dynamic_min: i64,
        #[arg(long)]
        dynamic_max: i64,
    },

    /// Set the VCPU count of a VM (maximum and at startup)
    SetVcpus {
        #[arg(long)]
        uuid: String,
        #[arg(long)]
        count: i64,
    },

    /// Change a VBD's bootable flag, mode or template-device flag
    SetVbd {
        #[arg(long)]
        uuid: String,
        #[arg(long)]
        bootable: Option<bool>,
        /// Access mode (ro, rw)
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        template_device: Option<bool>,
    },
}

/// Object classes `show` can load.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Network,
    Vm,
    Vif,
    Sr,
    Vdi,
    Vbd,
    Pif,
    Vlan,
}

impl ObjectKind {
    /// Whether the class can be looked up by name label.
    pub fn accepts_name(self) -> bool {
        matches!(self, Self::Network | Self::Vm | Self::Sr | Self::Vdi)
    }
}
