//! Serialization of tch types
#![allow(clippy::use_self)] // created by serde derive

use serde::{Deserialize, Serialize};
use tch::Device;

/// Remote serialization definition for [`tch::Device`].
///
/// Use `#[serde(with = "DeviceDef")]` when serializing a field of type [`Device`].
#[derive(Serialize, Deserialize)]
#[serde(remote = "Device")]
pub enum DeviceDef {
    Cpu,
    Cuda(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct WithDevice {
        #[serde(with = "DeviceDef")]
        device: Device,
    }

    #[test]
    fn device_json() {
        let value = WithDevice {
            device: Device::Cuda(1),
        };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"device":{"Cuda":1}}"#);
        let parsed: WithDevice = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn cpu_json() {
        let json = serde_json::to_string(&WithDevice {
            device: Device::Cpu,
        })
        .unwrap();
        assert_eq!(json, r#"{"device":"Cpu"}"#);
    }
}
