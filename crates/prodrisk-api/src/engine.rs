//! Boundary with the native production-planning engine.
//!
//! [`Engine`] lists every call the facade makes into the engine. A native
//! binding implements it over the engine's foreign-function interface;
//! [`crate::MemoryEngine`] implements it in-process. All methods take
//! `&self`: the engine handle is owned by one session and calls are
//! serialized by the caller.

use prodrisk_core::ProdriskResult;

/// Address of one attribute of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeKey<'a> {
    pub object_type: &'a str,
    pub object_name: &'a str,
    pub attribute: &'a str,
}

impl<'a> AttributeKey<'a> {
    pub fn new(object_type: &'a str, object_name: &'a str, attribute: &'a str) -> Self {
        Self {
            object_type,
            object_name,
            attribute,
        }
    }
}

impl std::fmt::Display for AttributeKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}].{}",
            self.object_type, self.object_name, self.attribute
        )
    }
}

/// Calls into the engine.
///
/// Getters return raw engine data: unset scalars come back as the engine's
/// sentinels and unset arrays as empty vectors. Interpretation is left to
/// [`crate::get_attribute_value`].
pub trait Engine {
    // === Catalogue ===

    /// All object types the engine knows about.
    fn object_type_names(&self) -> ProdriskResult<Vec<String>>;

    /// Names of all objects in the system, in engine order.
    ///
    /// Relation queries return indices into this array.
    fn object_names_in_system(&self) -> ProdriskResult<Vec<String>>;

    /// Types of all objects in the system, parallel to
    /// [`Engine::object_names_in_system`].
    fn object_types_in_system(&self) -> ProdriskResult<Vec<String>>;

    fn object_type_attribute_names(&self, object_type: &str) -> ProdriskResult<Vec<String>>;

    /// Datatype tags parallel to [`Engine::object_type_attribute_names`].
    fn object_type_attribute_datatypes(&self, object_type: &str) -> ProdriskResult<Vec<String>>;

    fn add_object(&self, object_type: &str, name: &str) -> ProdriskResult<()>;

    // === Metadata ===

    fn valid_attribute_info_keys(&self) -> ProdriskResult<Vec<String>>;

    fn attribute_info(&self, object_type: &str, attribute: &str, key: &str)
        -> ProdriskResult<String>;

    fn valid_object_info_keys(&self) -> ProdriskResult<Vec<String>>;

    fn object_info(&self, object_type: &str, key: &str) -> ProdriskResult<String>;

    // === Relations ===

    fn valid_relation_types(&self, object_type: &str) -> ProdriskResult<Vec<String>>;

    /// Indices of the objects this object points to through `relation_type`.
    fn relations(
        &self,
        object_type: &str,
        name: &str,
        relation_type: &str,
    ) -> ProdriskResult<Vec<usize>>;

    /// Indices of the objects pointing to this object through `relation_type`.
    fn input_relations(
        &self,
        object_type: &str,
        name: &str,
        relation_type: &str,
    ) -> ProdriskResult<Vec<usize>>;

    /// Relation type used when connecting `from_type` to `to_type` without
    /// an explicit choice.
    fn default_relation_type(&self, from_type: &str, to_type: &str) -> ProdriskResult<String>;

    fn add_relation(
        &self,
        from_type: &str,
        from_name: &str,
        relation_type: &str,
        to_type: &str,
        to_name: &str,
    ) -> ProdriskResult<()>;

    // === Scalars and arrays ===

    fn get_int_value(&self, key: &AttributeKey<'_>) -> ProdriskResult<i64>;
    fn set_int_value(&self, key: &AttributeKey<'_>, value: i64) -> ProdriskResult<()>;

    fn get_int_array(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<i64>>;
    fn set_int_array(&self, key: &AttributeKey<'_>, values: &[i64]) -> ProdriskResult<()>;

    fn get_double_value(&self, key: &AttributeKey<'_>) -> ProdriskResult<f64>;
    fn set_double_value(&self, key: &AttributeKey<'_>, value: f64) -> ProdriskResult<()>;

    fn get_double_array(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn set_double_array(&self, key: &AttributeKey<'_>, values: &[f64]) -> ProdriskResult<()>;

    fn get_string_value(&self, key: &AttributeKey<'_>) -> ProdriskResult<String>;
    fn set_string_value(&self, key: &AttributeKey<'_>, value: &str) -> ProdriskResult<()>;

    fn get_string_array(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<String>>;
    fn set_string_array(&self, key: &AttributeKey<'_>, values: &[String]) -> ProdriskResult<()>;

    // === Curves ===

    fn get_xy_curve_reference(&self, key: &AttributeKey<'_>) -> ProdriskResult<f64>;
    fn get_xy_curve_x(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn get_xy_curve_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn set_xy_curve(
        &self,
        key: &AttributeKey<'_>,
        reference: f64,
        x: &[f64],
        y: &[f64],
    ) -> ProdriskResult<()>;

    fn get_sy_curve_s(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<String>>;
    fn get_sy_curve_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn set_sy_curve(&self, key: &AttributeKey<'_>, s: &[String], y: &[f64])
        -> ProdriskResult<()>;

    fn get_xy_curve_array_references(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn get_xy_curve_array_n_points(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<usize>>;
    fn get_xy_curve_array_x(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn get_xy_curve_array_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;
    fn set_xy_curve_array(
        &self,
        key: &AttributeKey<'_>,
        references: &[f64],
        n_points: &[usize],
        x: &[f64],
        y: &[f64],
    ) -> ProdriskResult<()>;

    /// Time-step indices that hold an xyt curve.
    fn get_xyt_curve_times(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<i64>>;

    /// Concatenated x values of the xyt curves between `start` and `end`
    /// (engine time strings, both inclusive).
    fn get_xyt_curve_x(&self, key: &AttributeKey<'_>, start: &str, end: &str)
        -> ProdriskResult<Vec<f64>>;
    fn get_xyt_curve_y(&self, key: &AttributeKey<'_>, start: &str, end: &str)
        -> ProdriskResult<Vec<f64>>;
    fn get_xyt_curve_n(&self, key: &AttributeKey<'_>, start: &str, end: &str)
        -> ProdriskResult<Vec<usize>>;

    // === Time series ===

    /// Start time string of the series; empty when the series is not set.
    fn get_txy_series_start_time(&self, key: &AttributeKey<'_>) -> ProdriskResult<String>;

    /// Offsets from the series start, in hours.
    fn get_txy_series_t(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<i64>>;

    /// Values, scenario by scenario when the series is stochastic.
    fn get_txy_series_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>>;

    /// `y` holds `t.len()` values per scenario, scenario by scenario.
    fn set_txy_series(
        &self,
        key: &AttributeKey<'_>,
        start: &str,
        t: &[i64],
        y: &[f64],
    ) -> ProdriskResult<()>;

    // === Horizon ===

    fn start_time(&self) -> ProdriskResult<String>;
    fn end_time(&self) -> ProdriskResult<String>;
    fn time_unit(&self) -> ProdriskResult<String>;

    /// Breakpoints (in time units from the start) of the time resolution.
    fn time_resolution_t(&self) -> ProdriskResult<Vec<i64>>;

    /// Step length (in time units) valid from each breakpoint.
    fn time_resolution_y(&self) -> ProdriskResult<Vec<f64>>;

    fn set_optimization_period(&self, start: &str, end: &str) -> ProdriskResult<()>;

    // === Run control ===

    fn keep_working_directory(&self, keep: bool) -> ProdriskResult<()>;

    /// Write the engine's input files. Returns the engine's success flag.
    fn generate_prodrisk_files(&self) -> ProdriskResult<bool>;

    /// Run the optimization/simulation. Returns the engine's success flag.
    fn run_prodrisk(&self) -> ProdriskResult<bool>;
}
