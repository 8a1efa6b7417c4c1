//! Serde adapter encoding optional note content as standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match data {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded: Option<String> = Option::deserialize(deserializer)?;
    encoded
        .map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(default, with = "super", skip_serializing_if = "Option::is_none")]
        data: Option<Vec<u8>>,
    }

    #[test]
    fn encodes_bytes_as_base64() {
        let w = Wrapper {
            data: Some(b"buy milk".to_vec()),
        };
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"data":"YnV5IG1pbGs="}"#);
    }

    #[test]
    fn missing_and_null_decode_to_none() {
        let missing: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.data, None);
        let null: Wrapper = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert_eq!(null.data, None);
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"data":"***"}"#).is_err());
    }
}
