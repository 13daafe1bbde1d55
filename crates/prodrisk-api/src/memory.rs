//! In-process engine.
//!
//! [`MemoryEngine`] keeps the catalogue, objects, relations and raw
//! attribute data in memory and follows the engine's conventions: unset
//! scalars read as sentinels, unset arrays as empty vectors, relation
//! queries answer with indices into the system object arrays. It backs the
//! test-suites and lets models be assembled without the native engine.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use prodrisk_core::{parse_api_time, ProdriskError, ProdriskResult};
use tracing::debug;

use crate::engine::{AttributeKey, Engine};
use crate::xyt::{xyt_step, XytWindow};

type Key = (String, String, String);

#[derive(Debug, Clone, PartialEq)]
enum Stored {
    Int(i64),
    IntArray(Vec<i64>),
    Double(f64),
    DoubleArray(Vec<f64>),
    String(String),
    StringArray(Vec<String>),
    Xy {
        reference: f64,
        x: Vec<f64>,
        y: Vec<f64>,
    },
    Sy {
        s: Vec<String>,
        y: Vec<f64>,
    },
    XyArray {
        references: Vec<f64>,
        n_points: Vec<usize>,
        x: Vec<f64>,
        y: Vec<f64>,
    },
    /// Curves by time-step index.
    Xyt(BTreeMap<i64, Vec<(f64, f64)>>),
    Txy {
        start: String,
        t: Vec<i64>,
        y: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct Relation {
    from: usize,
    relation_type: String,
    to: usize,
}

#[derive(Debug, Clone)]
struct State {
    /// Attribute names and datatype tags per object type.
    catalogue: BTreeMap<String, Vec<(String, String)>>,
    /// `(type, name)` of every object, in creation order.
    objects: Vec<(String, String)>,
    values: HashMap<Key, Stored>,
    relations: Vec<Relation>,
    relation_types: HashMap<String, Vec<String>>,
    default_relations: HashMap<(String, String), String>,
    attribute_info_keys: Vec<String>,
    attribute_info: HashMap<Key, String>,
    object_info_keys: Vec<String>,
    object_info: HashMap<(String, String), String>,
    start_time: String,
    end_time: String,
    time_unit: String,
    resolution_t: Vec<i64>,
    resolution_y: Vec<f64>,
    keep_working_directory: bool,
    files_generated: bool,
    generate_ok: bool,
    run_ok: bool,
    calls: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            catalogue: BTreeMap::new(),
            objects: Vec::new(),
            values: HashMap::new(),
            relations: Vec::new(),
            relation_types: HashMap::new(),
            default_relations: HashMap::new(),
            attribute_info_keys: vec!["datatype".into(), "description".into()],
            attribute_info: HashMap::new(),
            object_info_keys: vec!["description".into()],
            object_info: HashMap::new(),
            start_time: String::new(),
            end_time: String::new(),
            time_unit: "hour".into(),
            resolution_t: vec![0],
            resolution_y: vec![1.0],
            keep_working_directory: false,
            files_generated: false,
            generate_ok: true,
            run_ok: true,
            calls: Vec::new(),
        }
    }
}

/// Engine implementation holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: RefCell<State>,
}

fn owned(key: &AttributeKey<'_>) -> Key {
    (
        key.object_type.to_string(),
        key.object_name.to_string(),
        key.attribute.to_string(),
    )
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an object type with `(attribute, datatype tag)` pairs.
    pub fn with_object_type(self, object_type: &str, attributes: &[(&str, &str)]) -> Self {
        self.state.borrow_mut().catalogue.insert(
            object_type.to_string(),
            attributes
                .iter()
                .map(|(name, tag)| (name.to_string(), tag.to_string()))
                .collect(),
        );
        self
    }

    /// Set the optimization horizon (engine time strings) and time unit.
    pub fn with_horizon(self, start: &str, end: &str, time_unit: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.start_time = start.to_string();
            state.end_time = end.to_string();
            state.time_unit = time_unit.to_string();
        }
        self
    }

    pub fn with_time_resolution(self, t: &[i64], y: &[f64]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.resolution_t = t.to_vec();
            state.resolution_y = y.to_vec();
        }
        self
    }

    /// Restrict the relation types valid from `object_type`.
    pub fn with_relation_types(self, object_type: &str, relation_types: &[&str]) -> Self {
        self.state.borrow_mut().relation_types.insert(
            object_type.to_string(),
            relation_types.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    pub fn with_default_relation(self, from_type: &str, to_type: &str, relation_type: &str) -> Self {
        self.state.borrow_mut().default_relations.insert(
            (from_type.to_string(), to_type.to_string()),
            relation_type.to_string(),
        );
        self
    }

    pub fn with_attribute_info(self, object_type: &str, attribute: &str, key: &str, value: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            if !state.attribute_info_keys.iter().any(|k| k == key) {
                state.attribute_info_keys.push(key.to_string());
            }
            state.attribute_info.insert(
                (object_type.to_string(), attribute.to_string(), key.to_string()),
                value.to_string(),
            );
        }
        self
    }

    pub fn with_object_info(self, object_type: &str, key: &str, value: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            if !state.object_info_keys.iter().any(|k| k == key) {
                state.object_info_keys.push(key.to_string());
            }
            state
                .object_info
                .insert((object_type.to_string(), key.to_string()), value.to_string());
        }
        self
    }

    /// Success flags returned by file generation and the run.
    pub fn with_run_status(self, generate_ok: bool, run_ok: bool) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.generate_ok = generate_ok;
            state.run_ok = run_ok;
        }
        self
    }

    /// Store the xyt curve of one time step.
    pub fn insert_xyt_curve(
        &self,
        key: &AttributeKey<'_>,
        index: i64,
        points: Vec<(f64, f64)>,
    ) -> ProdriskResult<()> {
        self.check_attribute(key)?;
        let mut state = self.state.borrow_mut();
        let entry = state
            .values
            .entry(owned(key))
            .or_insert_with(|| Stored::Xyt(BTreeMap::new()));
        match entry {
            Stored::Xyt(curves) => {
                curves.insert(index, points);
                Ok(())
            }
            _ => Err(ProdriskError::Engine(format!("{key} does not hold xyt data"))),
        }
    }

    /// Names of the engine calls made so far that change state or ask for
    /// defaults, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn keeps_working_directory(&self) -> bool {
        self.state.borrow().keep_working_directory
    }

    pub fn files_generated(&self) -> bool {
        self.state.borrow().files_generated
    }

    /// Relations as `(from name, relation type, to name)` triples.
    pub fn relation_list(&self) -> Vec<(String, String, String)> {
        let state = self.state.borrow();
        state
            .relations
            .iter()
            .map(|r| {
                (
                    state.objects[r.from].1.clone(),
                    r.relation_type.clone(),
                    state.objects[r.to].1.clone(),
                )
            })
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.borrow_mut().calls.push(call.into());
    }

    fn object_index(&self, object_type: &str, name: &str) -> ProdriskResult<usize> {
        self.state
            .borrow()
            .objects
            .iter()
            .position(|(t, n)| t == object_type && n == name)
            .ok_or_else(|| ProdriskError::UnknownObject {
                object_type: object_type.to_string(),
                name: name.to_string(),
            })
    }

    fn check_attribute(&self, key: &AttributeKey<'_>) -> ProdriskResult<()> {
        self.object_index(key.object_type, key.object_name)?;
        let state = self.state.borrow();
        let known = state
            .catalogue
            .get(key.object_type)
            .is_some_and(|attributes| attributes.iter().any(|(name, _)| name == key.attribute));
        if known {
            Ok(())
        } else {
            Err(ProdriskError::UnknownAttribute {
                object_type: key.object_type.to_string(),
                object: key.object_name.to_string(),
                attribute: key.attribute.to_string(),
            })
        }
    }

    fn load(&self, key: &AttributeKey<'_>) -> ProdriskResult<Option<Stored>> {
        self.check_attribute(key)?;
        Ok(self.state.borrow().values.get(&owned(key)).cloned())
    }

    fn store(&self, key: &AttributeKey<'_>, value: Stored) -> ProdriskResult<()> {
        self.check_attribute(key)?;
        debug!(attribute = %key, "memory engine write");
        self.state.borrow_mut().values.insert(owned(key), value);
        Ok(())
    }

    fn xyt_in_window(
        &self,
        key: &AttributeKey<'_>,
        start: &str,
        end: &str,
    ) -> ProdriskResult<Vec<Vec<(f64, f64)>>> {
        let curves = match self.load(key)? {
            Some(Stored::Xyt(curves)) => curves,
            _ => return Ok(Vec::new()),
        };
        let (_, step) = xyt_step(self)?;
        let window = XytWindow::resolve(
            parse_api_time(start)?,
            parse_api_time(end)?,
            parse_api_time(&self.start_time()?)?,
            parse_api_time(&self.end_time()?)?,
            step,
        );
        Ok(curves
            .into_iter()
            .filter(|(index, _)| window.contains(*index))
            .map(|(_, points)| points)
            .collect())
    }
}

impl Engine for MemoryEngine {
    fn object_type_names(&self) -> ProdriskResult<Vec<String>> {
        Ok(self.state.borrow().catalogue.keys().cloned().collect())
    }

    fn object_names_in_system(&self) -> ProdriskResult<Vec<String>> {
        Ok(self.state.borrow().objects.iter().map(|(_, n)| n.clone()).collect())
    }

    fn object_types_in_system(&self) -> ProdriskResult<Vec<String>> {
        Ok(self.state.borrow().objects.iter().map(|(t, _)| t.clone()).collect())
    }

    fn object_type_attribute_names(&self, object_type: &str) -> ProdriskResult<Vec<String>> {
        let state = self.state.borrow();
        let attributes = state
            .catalogue
            .get(object_type)
            .ok_or_else(|| ProdriskError::UnknownObjectType(object_type.to_string()))?;
        Ok(attributes.iter().map(|(name, _)| name.clone()).collect())
    }

    fn object_type_attribute_datatypes(&self, object_type: &str) -> ProdriskResult<Vec<String>> {
        let state = self.state.borrow();
        let attributes = state
            .catalogue
            .get(object_type)
            .ok_or_else(|| ProdriskError::UnknownObjectType(object_type.to_string()))?;
        Ok(attributes.iter().map(|(_, tag)| tag.clone()).collect())
    }

    fn add_object(&self, object_type: &str, name: &str) -> ProdriskResult<()> {
        self.record(format!("add_object {object_type} {name}"));
        let mut state = self.state.borrow_mut();
        if !state.catalogue.contains_key(object_type) {
            return Err(ProdriskError::UnknownObjectType(object_type.to_string()));
        }
        if !state.objects.iter().any(|(t, n)| t == object_type && n == name) {
            state.objects.push((object_type.to_string(), name.to_string()));
        }
        Ok(())
    }

    fn valid_attribute_info_keys(&self) -> ProdriskResult<Vec<String>> {
        Ok(self.state.borrow().attribute_info_keys.clone())
    }

    fn attribute_info(&self, object_type: &str, attribute: &str, key: &str) -> ProdriskResult<String> {
        let state = self.state.borrow();
        let stored = state.attribute_info.get(&(
            object_type.to_string(),
            attribute.to_string(),
            key.to_string(),
        ));
        if let Some(value) = stored {
            return Ok(value.clone());
        }
        if key == "datatype" {
            let tag = state
                .catalogue
                .get(object_type)
                .and_then(|attributes| attributes.iter().find(|(name, _)| name == attribute))
                .map(|(_, tag)| tag.clone());
            return Ok(tag.unwrap_or_default());
        }
        Ok(String::new())
    }

    fn valid_object_info_keys(&self) -> ProdriskResult<Vec<String>> {
        Ok(self.state.borrow().object_info_keys.clone())
    }

    fn object_info(&self, object_type: &str, key: &str) -> ProdriskResult<String> {
        Ok(self
            .state
            .borrow()
            .object_info
            .get(&(object_type.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn valid_relation_types(&self, object_type: &str) -> ProdriskResult<Vec<String>> {
        let state = self.state.borrow();
        if let Some(types) = state.relation_types.get(object_type) {
            return Ok(types.clone());
        }
        let mut types: Vec<String> = state
            .relations
            .iter()
            .filter(|r| state.objects[r.from].0 == object_type)
            .map(|r| r.relation_type.clone())
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    fn relations(&self, object_type: &str, name: &str, relation_type: &str) -> ProdriskResult<Vec<usize>> {
        let index = self.object_index(object_type, name)?;
        Ok(self
            .state
            .borrow()
            .relations
            .iter()
            .filter(|r| r.from == index && r.relation_type == relation_type)
            .map(|r| r.to)
            .collect())
    }

    fn input_relations(&self, object_type: &str, name: &str, relation_type: &str) -> ProdriskResult<Vec<usize>> {
        let index = self.object_index(object_type, name)?;
        Ok(self
            .state
            .borrow()
            .relations
            .iter()
            .filter(|r| r.to == index && r.relation_type == relation_type)
            .map(|r| r.from)
            .collect())
    }

    fn default_relation_type(&self, from_type: &str, to_type: &str) -> ProdriskResult<String> {
        self.record(format!("default_relation_type {from_type} {to_type}"));
        self.state
            .borrow()
            .default_relations
            .get(&(from_type.to_string(), to_type.to_string()))
            .cloned()
            .ok_or_else(|| {
                ProdriskError::Engine(format!(
                    "no default relation from {from_type} to {to_type}"
                ))
            })
    }

    fn add_relation(
        &self,
        from_type: &str,
        from_name: &str,
        relation_type: &str,
        to_type: &str,
        to_name: &str,
    ) -> ProdriskResult<()> {
        self.record(format!(
            "add_relation {from_type} {from_name} {relation_type} {to_type} {to_name}"
        ));
        let from = self.object_index(from_type, from_name)?;
        let to = self.object_index(to_type, to_name)?;
        let mut state = self.state.borrow_mut();
        if let Some(valid) = state.relation_types.get(from_type) {
            if !valid.iter().any(|r| r == relation_type) {
                return Err(ProdriskError::Engine(format!(
                    "relation type {relation_type} is not valid for {from_type}"
                )));
            }
        }
        state.relations.push(Relation {
            from,
            relation_type: relation_type.to_string(),
            to,
        });
        Ok(())
    }

    fn get_int_value(&self, key: &AttributeKey<'_>) -> ProdriskResult<i64> {
        Ok(match self.load(key)? {
            Some(Stored::Int(value)) => value,
            _ => i32::MIN as i64,
        })
    }

    fn set_int_value(&self, key: &AttributeKey<'_>, value: i64) -> ProdriskResult<()> {
        self.store(key, Stored::Int(value))
    }

    fn get_int_array(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<i64>> {
        Ok(match self.load(key)? {
            Some(Stored::IntArray(values)) => values,
            _ => Vec::new(),
        })
    }

    fn set_int_array(&self, key: &AttributeKey<'_>, values: &[i64]) -> ProdriskResult<()> {
        self.store(key, Stored::IntArray(values.to_vec()))
    }

    fn get_double_value(&self, key: &AttributeKey<'_>) -> ProdriskResult<f64> {
        Ok(match self.load(key)? {
            Some(Stored::Double(value)) => value,
            _ => -f64::MAX,
        })
    }

    fn set_double_value(&self, key: &AttributeKey<'_>, value: f64) -> ProdriskResult<()> {
        self.store(key, Stored::Double(value))
    }

    fn get_double_array(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::DoubleArray(values)) => values,
            _ => Vec::new(),
        })
    }

    fn set_double_array(&self, key: &AttributeKey<'_>, values: &[f64]) -> ProdriskResult<()> {
        self.store(key, Stored::DoubleArray(values.to_vec()))
    }

    fn get_string_value(&self, key: &AttributeKey<'_>) -> ProdriskResult<String> {
        Ok(match self.load(key)? {
            Some(Stored::String(value)) => value,
            _ => String::new(),
        })
    }

    fn set_string_value(&self, key: &AttributeKey<'_>, value: &str) -> ProdriskResult<()> {
        self.store(key, Stored::String(value.to_string()))
    }

    fn get_string_array(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<String>> {
        Ok(match self.load(key)? {
            Some(Stored::StringArray(values)) => values,
            _ => Vec::new(),
        })
    }

    fn set_string_array(&self, key: &AttributeKey<'_>, values: &[String]) -> ProdriskResult<()> {
        self.store(key, Stored::StringArray(values.to_vec()))
    }

    fn get_xy_curve_reference(&self, key: &AttributeKey<'_>) -> ProdriskResult<f64> {
        Ok(match self.load(key)? {
            Some(Stored::Xy { reference, .. }) => reference,
            _ => 0.0,
        })
    }

    fn get_xy_curve_x(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::Xy { x, .. }) => x,
            _ => Vec::new(),
        })
    }

    fn get_xy_curve_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::Xy { y, .. }) => y,
            _ => Vec::new(),
        })
    }

    fn set_xy_curve(&self, key: &AttributeKey<'_>, reference: f64, x: &[f64], y: &[f64]) -> ProdriskResult<()> {
        self.store(
            key,
            Stored::Xy {
                reference,
                x: x.to_vec(),
                y: y.to_vec(),
            },
        )
    }

    fn get_sy_curve_s(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<String>> {
        Ok(match self.load(key)? {
            Some(Stored::Sy { s, .. }) => s,
            _ => Vec::new(),
        })
    }

    fn get_sy_curve_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::Sy { y, .. }) => y,
            _ => Vec::new(),
        })
    }

    fn set_sy_curve(&self, key: &AttributeKey<'_>, s: &[String], y: &[f64]) -> ProdriskResult<()> {
        self.store(
            key,
            Stored::Sy {
                s: s.to_vec(),
                y: y.to_vec(),
            },
        )
    }

    fn get_xy_curve_array_references(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::XyArray { references, .. }) => references,
            _ => Vec::new(),
        })
    }

    fn get_xy_curve_array_n_points(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<usize>> {
        Ok(match self.load(key)? {
            Some(Stored::XyArray { n_points, .. }) => n_points,
            _ => Vec::new(),
        })
    }

    fn get_xy_curve_array_x(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::XyArray { x, .. }) => x,
            _ => Vec::new(),
        })
    }

    fn get_xy_curve_array_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::XyArray { y, .. }) => y,
            _ => Vec::new(),
        })
    }

    fn set_xy_curve_array(
        &self,
        key: &AttributeKey<'_>,
        references: &[f64],
        n_points: &[usize],
        x: &[f64],
        y: &[f64],
    ) -> ProdriskResult<()> {
        self.store(
            key,
            Stored::XyArray {
                references: references.to_vec(),
                n_points: n_points.to_vec(),
                x: x.to_vec(),
                y: y.to_vec(),
            },
        )
    }

    fn get_xyt_curve_times(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<i64>> {
        Ok(match self.load(key)? {
            Some(Stored::Xyt(curves)) => curves.keys().copied().collect(),
            _ => Vec::new(),
        })
    }

    fn get_xyt_curve_x(&self, key: &AttributeKey<'_>, start: &str, end: &str) -> ProdriskResult<Vec<f64>> {
        Ok(self
            .xyt_in_window(key, start, end)?
            .into_iter()
            .flat_map(|points| points.into_iter().map(|p| p.0))
            .collect())
    }

    fn get_xyt_curve_y(&self, key: &AttributeKey<'_>, start: &str, end: &str) -> ProdriskResult<Vec<f64>> {
        Ok(self
            .xyt_in_window(key, start, end)?
            .into_iter()
            .flat_map(|points| points.into_iter().map(|p| p.1))
            .collect())
    }

    fn get_xyt_curve_n(&self, key: &AttributeKey<'_>, start: &str, end: &str) -> ProdriskResult<Vec<usize>> {
        Ok(self
            .xyt_in_window(key, start, end)?
            .iter()
            .map(Vec::len)
            .collect())
    }

    fn get_txy_series_start_time(&self, key: &AttributeKey<'_>) -> ProdriskResult<String> {
        Ok(match self.load(key)? {
            Some(Stored::Txy { start, .. }) => start,
            _ => String::new(),
        })
    }

    fn get_txy_series_t(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<i64>> {
        Ok(match self.load(key)? {
            Some(Stored::Txy { t, .. }) => t,
            _ => Vec::new(),
        })
    }

    fn get_txy_series_y(&self, key: &AttributeKey<'_>) -> ProdriskResult<Vec<f64>> {
        Ok(match self.load(key)? {
            Some(Stored::Txy { y, .. }) => y,
            _ => Vec::new(),
        })
    }

    fn set_txy_series(&self, key: &AttributeKey<'_>, start: &str, t: &[i64], y: &[f64]) -> ProdriskResult<()> {
        if t.is_empty() || y.len() % t.len() != 0 {
            return Err(ProdriskError::Shape(format!(
                "{} values cannot be split over {} time offsets",
                y.len(),
                t.len()
            )));
        }
        self.store(
            key,
            Stored::Txy {
                start: start.to_string(),
                t: t.to_vec(),
                y: y.to_vec(),
            },
        )
    }

    fn start_time(&self) -> ProdriskResult<String> {
        Ok(self.state.borrow().start_time.clone())
    }

    fn end_time(&self) -> ProdriskResult<String> {
        Ok(self.state.borrow().end_time.clone())
    }

    fn time_unit(&self) -> ProdriskResult<String> {
        Ok(self.state.borrow().time_unit.clone())
    }

    fn time_resolution_t(&self) -> ProdriskResult<Vec<i64>> {
        Ok(self.state.borrow().resolution_t.clone())
    }

    fn time_resolution_y(&self) -> ProdriskResult<Vec<f64>> {
        Ok(self.state.borrow().resolution_y.clone())
    }

    fn set_optimization_period(&self, start: &str, end: &str) -> ProdriskResult<()> {
        let (from, to) = (parse_api_time(start)?, parse_api_time(end)?);
        if to <= from {
            return Err(ProdriskError::Engine(format!(
                "optimization period ends ({end}) before it starts ({start})"
            )));
        }
        self.record(format!("set_optimization_period {start} {end}"));
        let mut state = self.state.borrow_mut();
        state.start_time = start.to_string();
        state.end_time = end.to_string();
        Ok(())
    }

    fn keep_working_directory(&self, keep: bool) -> ProdriskResult<()> {
        self.record(format!("keep_working_directory {keep}"));
        self.state.borrow_mut().keep_working_directory = keep;
        Ok(())
    }

    fn generate_prodrisk_files(&self) -> ProdriskResult<bool> {
        self.record("generate_prodrisk_files");
        let mut state = self.state.borrow_mut();
        state.files_generated = state.generate_ok;
        Ok(state.generate_ok)
    }

    fn run_prodrisk(&self) -> ProdriskResult<bool> {
        self.record("run_prodrisk");
        let state = self.state.borrow();
        if !state.files_generated {
            return Ok(false);
        }
        Ok(state.run_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MemoryEngine {
        let engine = MemoryEngine::new()
            .with_object_type("plant", &[("max_prod", "double")])
            .with_object_type("reservoir", &[("max_vol", "double")]);
        engine.add_object("plant", "P1").unwrap();
        engine.add_object("reservoir", "R1").unwrap();
        engine
    }

    #[test]
    fn unset_scalars_read_as_sentinels() {
        let engine = engine();
        let key = AttributeKey::new("plant", "P1", "max_prod");
        assert_eq!(engine.get_double_value(&key).unwrap(), -f64::MAX);
        assert!(engine.get_double_array(&key).unwrap().is_empty());
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let engine = engine();
        let key = AttributeKey::new("plant", "P1", "min_prod");
        assert!(matches!(
            engine.set_double_value(&key, 1.0),
            Err(ProdriskError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn adding_an_existing_object_is_idempotent() {
        let engine = engine();
        engine.add_object("plant", "P1").unwrap();
        assert_eq!(engine.object_names_in_system().unwrap(), vec!["P1", "R1"]);
        assert!(engine.add_object("gate", "G1").is_err());
    }

    #[test]
    fn relations_are_indices_into_system_arrays() {
        let engine = engine();
        engine
            .add_relation("reservoir", "R1", "connection_standard", "plant", "P1")
            .unwrap();
        assert_eq!(
            engine.relations("reservoir", "R1", "connection_standard").unwrap(),
            vec![0]
        );
        assert_eq!(
            engine.input_relations("plant", "P1", "connection_standard").unwrap(),
            vec![1]
        );
        assert_eq!(
            engine.valid_relation_types("reservoir").unwrap(),
            vec!["connection_standard"]
        );
    }

    #[test]
    fn run_requires_generated_files() {
        let engine = MemoryEngine::new().with_run_status(false, true);
        assert!(!engine.generate_prodrisk_files().unwrap());
        assert!(!engine.run_prodrisk().unwrap());
        assert_eq!(engine.calls(), vec!["generate_prodrisk_files", "run_prodrisk"]);
    }

    #[test]
    fn optimization_period_sets_horizon() {
        let engine = MemoryEngine::new();
        engine
            .set_optimization_period("202201010000", "202201080000")
            .unwrap();
        assert_eq!(engine.start_time().unwrap(), "202201010000");
        assert_eq!(engine.end_time().unwrap(), "202201080000");
        assert!(engine
            .set_optimization_period("202201080000", "202201010000")
            .is_err());
    }
}
