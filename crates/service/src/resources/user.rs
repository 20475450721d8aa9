use serde::Deserialize;
use serde_json::Value;

use crate::engine::{FieldRule, Resource};

pub struct User;

#[derive(Clone, Debug, Deserialize)]
pub struct UserPayload {
    pub nombre: Value,
    pub apellido: Value,
    pub email: Value,
    pub telefono: Value,
    pub direccion: Value,
    pub tipo_usuario: Value,
    pub username: Value,
    pub password: Value,
    /// National id; only required when the extended user schema is enabled.
    #[serde(default)]
    pub cedula: Option<Value>,
}

impl User {
    /// Required fields of the extended schema: the base set plus `cedula`.
    pub fn extended_fields() -> Vec<FieldRule> {
        let mut rules = Self::required_fields();
        rules.push(FieldRule::text("cedula"));
        rules
    }
}

impl Resource for User {
    type Payload = UserPayload;

    const COLLECTION: &'static str = "usuarios";
    const PRIMARY_KEY: &'static str = "id_usuario";
    const MISSING_DATA: &'static str = "Faltan datos en el usuario.";
    const NOT_FOUND: &'static str = "Usuario no encontrado.";
    const DELETED: &'static str = "Usuarios eliminados correctamente";

    fn required_fields() -> Vec<FieldRule> {
        [
            "nombre",
            "apellido",
            "email",
            "telefono",
            "direccion",
            "tipo_usuario",
            "username",
            "password",
        ]
        .into_iter()
        .map(FieldRule::text)
        .collect()
    }

    fn fields(payload: UserPayload) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            ("nombre", payload.nombre),
            ("apellido", payload.apellido),
            ("email", payload.email),
            ("telefono", payload.telefono),
            ("direccion", payload.direccion),
            ("tipo_usuario", payload.tipo_usuario),
            ("username", payload.username),
            ("password", payload.password),
        ];
        if let Some(cedula) = payload.cedula {
            fields.push(("cedula", cedula));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{merge, validate::missing_fields};
    use serde_json::json;

    fn ana() -> Value {
        json!({
            "nombre": "Ana",
            "apellido": "Pérez",
            "email": "ana@example.com",
            "telefono": 5551234,
            "direccion": "Calle 1",
            "tipo_usuario": "admin",
            "username": "ana",
            "password": "secreta"
        })
    }

    #[test]
    fn extended_schema_requires_national_id() {
        assert!(missing_fields(&User::required_fields(), &ana()).is_empty());
        assert_eq!(missing_fields(&User::extended_fields(), &ana()), vec!["cedula"]);
    }

    #[test]
    fn create_without_cedula_omits_the_field() {
        let fields = User::fields(serde_json::from_value(ana()).unwrap());
        assert!(fields.iter().all(|(name, _)| *name != "cedula"));
        assert!(fields.contains(&("telefono", json!(5551234))));
    }

    #[test]
    fn merge_keeps_cedula_when_payload_has_none() {
        let mut user = ana();
        user["id_usuario"] = json!("1");
        user["cedula"] = json!("0102030405");

        merge::<User>(&mut user, ana().as_object().unwrap().clone());
        assert_eq!(user["cedula"], "0102030405");
        assert_eq!(user["id_usuario"], "1");
    }
}
