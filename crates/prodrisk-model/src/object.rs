use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use prodrisk_api::Engine;
use prodrisk_core::{Datatype, ProdriskError, ProdriskResult};
use tracing::debug;

use crate::attribute::AttributeProxy;

/// Which relations of an object to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Both,
    Input,
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Both => "both",
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }

    fn includes_input(self) -> bool {
        matches!(self, Direction::Both | Direction::Input)
    }

    fn includes_output(self) -> bool {
        matches!(self, Direction::Both | Direction::Output)
    }
}

impl FromStr for Direction {
    type Err = ProdriskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" => Ok(Direction::Both),
            "input" => Ok(Direction::Input),
            "output" => Ok(Direction::Output),
            _ => Err(ProdriskError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One object in the engine, with the attributes its type defines.
pub struct ObjectProxy {
    engine: Rc<dyn Engine>,
    object_type: String,
    name: String,
    attributes: Vec<(String, Datatype)>,
    cache: RefCell<HashMap<String, Rc<AttributeProxy>>>,
}

impl fmt::Debug for ObjectProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectProxy")
            .field("object_type", &self.object_type)
            .field("name", &self.name)
            .finish()
    }
}

impl ObjectProxy {
    pub(crate) fn new(engine: Rc<dyn Engine>, object_type: &str, name: &str) -> ProdriskResult<Self> {
        let names = engine.object_type_attribute_names(object_type)?;
        let tags = engine.object_type_attribute_datatypes(object_type)?;
        if names.len() != tags.len() {
            return Err(ProdriskError::Shape(format!(
                "{object_type} reports {} attribute names but {} datatypes",
                names.len(),
                tags.len()
            )));
        }
        Ok(Self {
            engine,
            object_type: object_type.to_string(),
            name: name.to_string(),
            attributes: names.into_iter().zip(tags.into_iter().map(Datatype::from)).collect(),
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn datatype(&self, attribute: &str) -> Option<&Datatype> {
        self.attributes
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, datatype)| datatype)
    }

    /// Proxy of the named attribute; the same `Rc` on every call.
    pub fn attribute(&self, attribute: &str) -> ProdriskResult<Rc<AttributeProxy>> {
        if let Some(proxy) = self.cache.borrow().get(attribute) {
            return Ok(Rc::clone(proxy));
        }
        let datatype = self
            .datatype(attribute)
            .cloned()
            .ok_or_else(|| ProdriskError::UnknownAttribute {
                object_type: self.object_type.clone(),
                object: self.name.clone(),
                attribute: attribute.to_string(),
            })?;
        let proxy = Rc::new(AttributeProxy::new(
            Rc::clone(&self.engine),
            &self.object_type,
            &self.name,
            attribute,
            datatype,
        ));
        self.cache
            .borrow_mut()
            .insert(attribute.to_string(), Rc::clone(&proxy));
        Ok(proxy)
    }

    /// Objects related to this one.
    ///
    /// `relation_type` of `None` (or `"all"`) follows every relation type
    /// the engine lists as valid for this object type. Input relations come
    /// before output relations.
    pub fn relations(&self, direction: Direction, relation_type: Option<&str>) -> ProdriskResult<Vec<ObjectProxy>> {
        let relation_types = match relation_type.map(str::to_lowercase) {
            Some(relation) if relation != "all" => vec![relation],
            _ => self.engine.valid_relation_types(&self.object_type)?,
        };

        let mut indices = Vec::new();
        if direction.includes_input() {
            for relation in &relation_types {
                indices.extend(self.engine.input_relations(&self.object_type, &self.name, relation)?);
            }
        }
        if direction.includes_output() {
            for relation in &relation_types {
                indices.extend(self.engine.relations(&self.object_type, &self.name, relation)?);
            }
        }
        self.objects_at(&indices)
    }

    /// Connect this object to `other`.
    ///
    /// Without an explicit relation the engine's default for the two object
    /// types is used; explicit values are `spill`, `bypass` and `standard`.
    pub fn connect_to(&self, other: &ObjectProxy, relation: Option<&str>) -> ProdriskResult<()> {
        let relation_type = match relation.map(str::to_lowercase).filter(|r| !r.is_empty()) {
            None => self
                .engine
                .default_relation_type(&self.object_type, &other.object_type)?,
            Some(relation) => match relation.as_str() {
                "spill" => "connection_spill".to_string(),
                "bypass" => "connection_bypass".to_string(),
                "standard" => "connection_standard".to_string(),
                _ => return Err(ProdriskError::UnknownRelationType(relation)),
            },
        };
        debug!(
            from = %self.name,
            to = %other.name,
            relation = %relation_type,
            "connect objects"
        );
        self.engine.add_relation(
            &self.object_type,
            &self.name,
            &relation_type,
            &other.object_type,
            &other.name,
        )
    }

    /// Generators of a plant.
    pub fn generators(&self) -> ProdriskResult<Vec<ObjectProxy>> {
        self.plant_members("generator_of_plant")
    }

    /// Unit combinations of a plant.
    pub fn unit_combinations(&self) -> ProdriskResult<Vec<ObjectProxy>> {
        self.plant_members("unit_combination_of_plant")
    }

    fn plant_members(&self, relation: &str) -> ProdriskResult<Vec<ObjectProxy>> {
        if self.object_type != "plant" {
            return Err(ProdriskError::UnknownAttribute {
                object_type: self.object_type.clone(),
                object: self.name.clone(),
                attribute: relation.to_string(),
            });
        }
        let indices = self.engine.relations(&self.object_type, &self.name, relation)?;
        self.objects_at(&indices)
    }

    /// Fresh proxies for positions in the engine's system object arrays.
    fn objects_at(&self, indices: &[usize]) -> ProdriskResult<Vec<ObjectProxy>> {
        let names = self.engine.object_names_in_system()?;
        let types = self.engine.object_types_in_system()?;
        indices
            .iter()
            .map(|&index| match (types.get(index), names.get(index)) {
                (Some(object_type), Some(name)) => {
                    ObjectProxy::new(Rc::clone(&self.engine), object_type, name)
                }
                _ => Err(ProdriskError::Shape(format!(
                    "relation index {index} outside the {} system objects",
                    names.len()
                ))),
            })
            .collect()
    }
}
