use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use prodrisk_api::{get_object_info, Engine, Info};
use prodrisk_core::{ProdriskError, ProdriskResult};
use tracing::debug;

use crate::object::ObjectProxy;

/// Object types of the engine catalogue, each with the objects it held when
/// the snapshot was taken.
pub struct ModelBuilder {
    engine: Rc<dyn Engine>,
    ignores: Vec<String>,
    types: BTreeMap<String, Rc<ObjectTypeProxy>>,
}

impl ModelBuilder {
    /// Snapshot the catalogue, leaving out the object types in `ignores`.
    pub fn new(engine: Rc<dyn Engine>, ignores: &[&str]) -> ProdriskResult<Self> {
        let mut builder = Self {
            engine,
            ignores: ignores.iter().map(|s| s.to_string()).collect(),
            types: BTreeMap::new(),
        };
        builder.update()?;
        Ok(builder)
    }

    /// Rebuild the snapshot from the engine. Previously handed out proxies
    /// keep working but are no longer the cached ones.
    pub fn update(&mut self) -> ProdriskResult<()> {
        let mut objects: BTreeMap<String, Vec<String>> = self
            .engine
            .object_type_names()?
            .into_iter()
            .filter(|t| !self.ignores.contains(t))
            .map(|t| (t, Vec::new()))
            .collect();

        let names = self.engine.object_names_in_system()?;
        let types = self.engine.object_types_in_system()?;
        for (name, object_type) in names.into_iter().zip(types) {
            if let Some(list) = objects.get_mut(&object_type) {
                list.push(name);
            }
        }

        self.types = objects
            .into_iter()
            .map(|(object_type, names)| {
                let proxy = ObjectTypeProxy::new(Rc::clone(&self.engine), object_type.clone(), names);
                (object_type, Rc::new(proxy))
            })
            .collect();
        debug!(object_types = self.types.len(), "model snapshot updated");
        Ok(())
    }

    pub fn get(&self, object_type: &str) -> ProdriskResult<Rc<ObjectTypeProxy>> {
        self.types
            .get(object_type)
            .cloned()
            .ok_or_else(|| ProdriskError::UnknownObjectType(object_type.to_string()))
    }

    /// Object type names in the snapshot.
    pub fn names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn engine(&self) -> &Rc<dyn Engine> {
        &self.engine
    }
}

impl fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("object_types", &self.names())
            .field("ignores", &self.ignores)
            .finish()
    }
}

/// Objects of one type.
pub struct ObjectTypeProxy {
    engine: Rc<dyn Engine>,
    object_type: String,
    names: RefCell<Vec<String>>,
    objects: RefCell<HashMap<String, Rc<ObjectProxy>>>,
}

impl fmt::Debug for ObjectTypeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectTypeProxy")
            .field("object_type", &self.object_type)
            .field("names", &self.names.borrow())
            .finish()
    }
}

impl ObjectTypeProxy {
    pub(crate) fn new(engine: Rc<dyn Engine>, object_type: String, names: Vec<String>) -> Self {
        Self {
            engine,
            object_type,
            names: RefCell::new(names),
            objects: RefCell::new(HashMap::new()),
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Proxy of the named object; the same `Rc` on every call.
    pub fn get(&self, name: &str) -> ProdriskResult<Rc<ObjectProxy>> {
        if !self.names.borrow().iter().any(|n| n == name) {
            return Err(ProdriskError::UnknownObject {
                object_type: self.object_type.clone(),
                name: name.to_string(),
            });
        }
        if let Some(object) = self.objects.borrow().get(name) {
            return Ok(Rc::clone(object));
        }

        let object = Rc::new(ObjectProxy::new(
            Rc::clone(&self.engine),
            &self.object_type,
            name,
        )?);
        self.objects
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&object));
        Ok(object)
    }

    pub fn object_names(&self) -> Vec<String> {
        self.names.borrow().clone()
    }

    /// Proxies of all known objects, in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = ProdriskResult<Rc<ObjectProxy>>> + '_ {
        self.object_names().into_iter().map(move |name| self.get(&name))
    }

    /// Create an object in the engine and register it.
    ///
    /// The name is only registered if the engine reports it afterwards.
    pub fn add_object(&self, name: &str) -> ProdriskResult<Rc<ObjectProxy>> {
        self.engine.add_object(&self.object_type, name)?;
        let created = self
            .engine
            .object_names_in_system()?
            .into_iter()
            .zip(self.engine.object_types_in_system()?)
            .any(|(n, t)| n == name && t == self.object_type);
        if created && !self.names.borrow().iter().any(|n| n == name) {
            debug!(object_type = %self.object_type, name, "object added");
            self.names.borrow_mut().push(name.to_string());
        }
        self.get(name)
    }

    pub fn info(&self, key: Option<&str>) -> ProdriskResult<Info> {
        get_object_info(self.engine.as_ref(), &self.object_type, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodrisk_api::MemoryEngine;

    fn engine() -> Rc<dyn Engine> {
        let engine = MemoryEngine::new()
            .with_object_type("plant", &[("max_prod", "double")])
            .with_object_type("reservoir", &[("max_vol", "double")])
            .with_object_type("setting", &[("n_scen", "int")]);
        engine.add_object("plant", "P1").unwrap();
        engine.add_object("reservoir", "R1").unwrap();
        engine.add_object("plant", "P2").unwrap();
        engine.add_object("setting", "setting").unwrap();
        Rc::new(engine)
    }

    #[test]
    fn snapshot_groups_objects_by_type() {
        let model = ModelBuilder::new(engine(), &["setting"]).unwrap();
        assert_eq!(model.names(), vec!["plant", "reservoir"]);
        assert_eq!(model.get("plant").unwrap().object_names(), vec!["P1", "P2"]);
        assert!(model.get("setting").unwrap_err().is_not_found());
    }

    #[test]
    fn proxies_format_with_their_catalogue_names() {
        let model = ModelBuilder::new(engine(), &["setting"]).unwrap();
        let plants = format!("{:?}", model.get("plant").unwrap());
        assert!(plants.contains("plant") && plants.contains("P2"));
        assert!(format!("{model:?}").contains("reservoir"));
    }

    #[test]
    fn snapshot_is_not_refreshed_until_update() {
        let mut model = ModelBuilder::new(engine(), &[]).unwrap();
        model.engine().add_object("plant", "P3").unwrap();
        assert!(model.get("plant").unwrap().get("P3").is_err());

        model.update().unwrap();
        assert!(model.get("plant").unwrap().get("P3").is_ok());
    }

    #[test]
    fn iter_visits_objects_in_order() {
        let model = ModelBuilder::new(engine(), &[]).unwrap();
        let names: Vec<String> = model
            .get("plant")
            .unwrap()
            .iter()
            .map(|object| object.unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["P1", "P2"]);
    }
}
