use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Acknowledgment body for operations that return no record.
#[derive(Serialize, Debug)]
pub struct Message {
    pub message: String,
}
