use serde::Deserialize;
use serde_json::Value;

use crate::engine::{FieldRule, Resource};

/// A request record. Only its status can be changed through the API; the
/// records themselves are created elsewhere.
pub struct Request;

#[derive(Clone, Debug, Deserialize)]
pub struct RequestPayload {
    pub estado: Value,
}

impl Resource for Request {
    type Payload = RequestPayload;

    const COLLECTION: &'static str = "solicitudes";
    const PRIMARY_KEY: &'static str = "id_solicitud";
    const MISSING_DATA: &'static str = "Faltan datos en la solicitud.";
    const NOT_FOUND: &'static str = "Solicitud no encontrada.";
    const DELETED: &'static str = "Solicitudes eliminadas correctamente";

    fn required_fields() -> Vec<FieldRule> { vec![FieldRule::text("estado")] }

    fn fields(payload: RequestPayload) -> Vec<(&'static str, Value)> { vec![("estado", payload.estado)] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::merge;
    use serde_json::json;

    #[test]
    fn status_update_keeps_the_rest_of_the_request() {
        let mut request = json!({
            "id_solicitud": "3",
            "estado": "pendiente",
            "id_usuario": "2",
            "productos": [{"id_producto": "1", "cantidad": 4}]
        });

        let payload = json!({"estado": "aprobada", "id_solicitud": "9"});
        merge::<Request>(&mut request, payload.as_object().unwrap().clone());

        assert_eq!(request["estado"], "aprobada");
        assert_eq!(request["id_solicitud"], "3");
        assert_eq!(request["id_usuario"], "2");
        assert_eq!(request["productos"][0]["cantidad"], 4);
    }
}
