//! The template-device flag stored in a VBD's `other_config`.
//!
//! XenAPI has no such field, so the flag lives under a reserved key as the
//! string `"true"` or `"false"`.

use xenserver_api::StringMap;

use crate::warning::PopulateWarning;

/// Reserved `other_config` key.
pub const TEMPLATE_DEVICE_KEY: &str = "template_device";

/// Read the flag. A missing key means `false`.
pub fn decode(other_config: &StringMap) -> Result<bool, PopulateWarning> {
    match other_config.get(TEMPLATE_DEVICE_KEY) {
        None => Ok(false),
        Some(value) => parse_bool(value).ok_or_else(|| PopulateWarning::UnparsableTemplateDevice {
            value: value.clone(),
        }),
    }
}

/// Write the flag into the map, replacing any previous value.
pub fn encode(other_config: &mut StringMap, value: bool) {
    other_config.insert(TEMPLATE_DEVICE_KEY.to_string(), value.to_string());
}

/// Boolean spellings accepted by XenServer tooling.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut map = StringMap::new();
        assert_eq!(decode(&map), Ok(false));

        map.insert(TEMPLATE_DEVICE_KEY.to_string(), "True".to_string());
        assert_eq!(decode(&map), Ok(true));

        map.insert(TEMPLATE_DEVICE_KEY.to_string(), "0".to_string());
        assert_eq!(decode(&map), Ok(false));

        map.insert(TEMPLATE_DEVICE_KEY.to_string(), "yes".to_string());
        assert_eq!(
            decode(&map),
            Err(PopulateWarning::UnparsableTemplateDevice { value: "yes".to_string() })
        );
    }

    #[test]
    fn test_encode_keeps_other_keys() {
        let mut map = StringMap::new();
        map.insert("owner".to_string(), "ops".to_string());

        encode(&mut map, true);
        assert_eq!(map.get(TEMPLATE_DEVICE_KEY).map(String::as_str), Some("true"));
        assert_eq!(map.get("owner").map(String::as_str), Some("ops"));

        encode(&mut map, false);
        assert_eq!(map.get(TEMPLATE_DEVICE_KEY).map(String::as_str), Some("false"));
    }
}
