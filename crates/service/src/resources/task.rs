use serde::Deserialize;
use serde_json::Value;

use crate::engine::{FieldRule, Resource};

pub struct Task;

/// `fecha_fin` stays out of a new record unless sent; `horas_trabajadas` starts at 0.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskPayload {
    pub titulo: Value,
    pub descripcion: Value,
    pub fecha_inicio: Value,
    #[serde(default)]
    pub fecha_fin: Option<Value>,
    pub estado: Value,
    pub id_trabajador: Value,
    pub id_supervisor: Value,
    #[serde(default)]
    pub horas_trabajadas: Option<Value>,
}

impl Resource for Task {
    type Payload = TaskPayload;

    const COLLECTION: &'static str = "tareas";
    const PRIMARY_KEY: &'static str = "id_tarea";
    const MISSING_DATA: &'static str = "Faltan datos en la tarea.";
    const NOT_FOUND: &'static str = "Tarea no encontrada.";
    const DELETED: &'static str = "Tareas eliminadas correctamente";

    fn required_fields() -> Vec<FieldRule> {
        ["titulo", "descripcion", "fecha_inicio", "estado", "id_trabajador", "id_supervisor"]
            .into_iter()
            .map(FieldRule::text)
            .collect()
    }

    fn fields(payload: TaskPayload) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            ("titulo", payload.titulo),
            ("descripcion", payload.descripcion),
            ("fecha_inicio", payload.fecha_inicio),
        ];
        if let Some(fin) = payload.fecha_fin {
            fields.push(("fecha_fin", fin));
        }
        fields.extend([
            ("estado", payload.estado),
            ("id_trabajador", payload.id_trabajador),
            ("id_supervisor", payload.id_supervisor),
            ("horas_trabajadas", payload.horas_trabajadas.unwrap_or_else(|| Value::from(0))),
        ]);
        fields
    }
}
