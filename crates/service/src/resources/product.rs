use serde::Deserialize;
use serde_json::Value;

use crate::engine::{FieldRule, Resource};

pub struct Product;

#[derive(Clone, Debug, Deserialize)]
pub struct ProductPayload {
    pub nombre: Value,
    pub categoria: Value,
    pub stock: Value,
}

impl Resource for Product {
    type Payload = ProductPayload;

    const COLLECTION: &'static str = "productos";
    const PRIMARY_KEY: &'static str = "id_producto";
    const MISSING_DATA: &'static str = "Faltan datos en el producto.";
    const NOT_FOUND: &'static str = "Producto no encontrado.";
    const DELETED: &'static str = "Productos eliminados correctamente";

    fn required_fields() -> Vec<FieldRule> {
        vec![FieldRule::text("nombre"), FieldRule::text("categoria"), FieldRule::number("stock")]
    }

    fn fields(payload: ProductPayload) -> Vec<(&'static str, Value)> {
        vec![("nombre", payload.nombre), ("categoria", payload.categoria), ("stock", payload.stock)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_follow_document_order() {
        let payload: ProductPayload = serde_json::from_value(
            json!({"stock": 0, "categoria": "Ferretería", "nombre": "Tornillo", "precio": 3}),
        )
        .unwrap();
        let names: Vec<&str> = Product::fields(payload).into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["nombre", "categoria", "stock"]);
    }
}
