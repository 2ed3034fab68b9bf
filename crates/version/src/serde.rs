//! Versions serialize as their dotted string form.

use crate::Version;
use serde::de::{Deserialize, Deserializer, Error as DeError};
use serde::ser::{Serialize, Serializer};

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: crate::error::Error| D::Error::custom(&*e))
    }
}

#[cfg(test)]
mod tests {
    use crate::Version;

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&Version::new(1, 2).with_build(3)).unwrap();
        assert_eq!(json, "\"1.2.3\"");
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert_eq!(serde_json::from_str::<Version>("\"2.0\"").unwrap(), Version::new(2, 0));
        assert!(serde_json::from_str::<Version>("\"two\"").is_err());
    }
}
