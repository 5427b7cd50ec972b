//! Superficie declarativa del motor.
//!
//! Un documento de pipes es un mapa `nombre -> PipeDef` cuyo ORDEN de
//! declaración importa: las referencias entre pipes sólo resuelven hacia
//! atrás, por eso todas las colecciones nombradas usan `IndexMap`.
//! - `PipeDef` es un fitting único o una secuencia de `Step`s.
//! - Un `Step` con una sola clave es un fitting/pipe con input; con varias
//!   claves es azúcar para el fan-out paralelo.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Documento completo: nombre de pipe -> definición, en orden de declaración.
pub type PipesConfig = IndexMap<String, PipeDef>;

/// Definición declarativa de un pipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipeDef {
    /// Secuencia ordenada de pasos.
    Steps(Vec<Step>),
    /// Un pipe de un solo fitting.
    Fitting(FittingDef),
}

/// Un paso dentro de una secuencia.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Nombre pelado: un pipe ya compilado o un fitting sin input.
    Name(String),
    /// Mapa clave -> input. Una entrada: fitting/pipe con input; varias
    /// entradas: ramas de un fan-out paralelo.
    Map(IndexMap<String, Value>),
}

/// Definición de un fitting individual.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FittingDef {
    /// Selección explícita del tipo de fitting; ausente = resolución anónima
    /// (user, luego system).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub fitting_type: Option<String>,
    pub name: String,
    /// Especificación de input (literal, array, objeto o referencia).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Campo destino del resultado; por defecto `output`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Configuración propia de la factory (opaca para el motor).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl FittingDef {
    /// Definición mínima con sólo nombre (steps de nombre pelado).
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               ..Default::default() }
    }

    /// Definición con nombre e input.
    pub fn with_input(name: impl Into<String>, input: Value) -> Self {
        Self { name: name.into(),
               input: Some(input),
               ..Default::default() }
    }
}
