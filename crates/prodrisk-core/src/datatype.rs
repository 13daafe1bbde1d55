//! Attribute datatype tags as reported by the engine catalogue.

use serde::{Deserialize, Serialize};

/// Datatype of an engine attribute.
///
/// The tag comes from the engine's attribute metadata and is never inferred
/// from a value. Tags outside the known set are kept verbatim in
/// [`Datatype::Unknown`]; reading such an attribute yields no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Datatype {
    Int,
    IntArray,
    Double,
    DoubleArray,
    String,
    StringArray,
    /// Curve of (x, y) points with a numeric reference.
    Xy,
    /// Ordered sequence of xy curves.
    XyArray,
    /// Curve with string labels on the first axis.
    Sy,
    /// One xy curve per time step of the optimization horizon.
    Xyt,
    /// Time series with one value per timestamp.
    Txy,
    /// Time series with one value per scenario per timestamp.
    TxyStochastic,
    Unknown(String),
}

impl Datatype {
    /// Parse an engine datatype tag. Never fails.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "int" => Datatype::Int,
            "int_array" => Datatype::IntArray,
            "double" => Datatype::Double,
            "double_array" => Datatype::DoubleArray,
            "string" => Datatype::String,
            "string_array" => Datatype::StringArray,
            "xy" => Datatype::Xy,
            "xy_array" => Datatype::XyArray,
            "sy" => Datatype::Sy,
            "xyt" => Datatype::Xyt,
            "txy" => Datatype::Txy,
            "txy_stochastic" => Datatype::TxyStochastic,
            other => Datatype::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Datatype::Int => "int",
            Datatype::IntArray => "int_array",
            Datatype::Double => "double",
            Datatype::DoubleArray => "double_array",
            Datatype::String => "string",
            Datatype::StringArray => "string_array",
            Datatype::Xy => "xy",
            Datatype::XyArray => "xy_array",
            Datatype::Sy => "sy",
            Datatype::Xyt => "xyt",
            Datatype::Txy => "txy",
            Datatype::TxyStochastic => "txy_stochastic",
            Datatype::Unknown(tag) => tag,
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Datatype {
    fn from(tag: &str) -> Self {
        Datatype::from_tag(tag)
    }
}

impl From<String> for Datatype {
    fn from(tag: String) -> Self {
        Datatype::from_tag(&tag)
    }
}

impl From<Datatype> for String {
    fn from(datatype: Datatype) -> Self {
        datatype.as_str().to_string()
    }
}
