//! The externally submitted request shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A token meaning "every valid value of this field", accepted for `productos` and
/// `bandas`.
pub const ALL: &str = "ALL";

/// A request as submitted by a client, prior to normalization.
///
/// `fechas` maps a date key (`YYYYMMDD` or `YYYYMMDD-YYYYMMDD`) to a list of time-range
/// strings (`HH:MM` or `HH:MM-HH:MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Satellite name or operational alias; defaults to the catalog default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<String>,

    /// Sensor id (`abi`, `suvi`, `glm`); defaults to `abi` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,

    /// Processing level (`L1b`, `L2`); defaults to `L1b` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel: Option<String>,

    /// Geographic domain (`fd`, `conus`). Required.
    pub dominio: String,

    /// Product codes, or `["ALL"]`. Required when `nivel` is `L2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productos: Option<Vec<String>>,

    /// Band codes, or `["ALL"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandas: Option<Vec<String>>,

    /// Date key to time-range-string list mapping.
    pub fechas: BTreeMap<String, Vec<String>>,

    /// Free-form identifier of the requester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creado_por: Option<String>,

    /// Free-text description, present only on recovery-query payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

impl Request {
    /// Returns a copy of this request with `creado_por` cleared and `descripcion` set,
    /// as used when building a recovery-query payload.
    #[must_use]
    pub fn into_recovery_payload(mut self, descripcion: impl Into<String>) -> Self {
        self.creado_por = None;
        self.descripcion = Some(descripcion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_request() {
        let json = r#"{"dominio":"fd","fechas":{"20231026":["12:00"]}}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert_eq!(req.dominio, "fd");
        assert!(req.sat.is_none());
        assert_eq!(req.fechas.get("20231026").unwrap(), &vec!["12:00".to_string()]);
    }

    #[test]
    fn recovery_payload_clears_creator_and_sets_description() {
        let req = Request {
            sat: None,
            sensor: None,
            nivel: None,
            dominio: "fd".to_string(),
            productos: None,
            bandas: None,
            fechas: BTreeMap::new(),
            creado_por: Some("alice".to_string()),
            descripcion: None,
        };
        let recovered = req.into_recovery_payload("recovered from failed targets");
        assert!(recovered.creado_por.is_none());
        assert_eq!(
            recovered.descripcion.as_deref(),
            Some("recovered from failed targets")
        );
    }
}
