use std::fmt;
use std::rc::Rc;

use chrono::NaiveDateTime;
use prodrisk_api::{
    get_attribute_info, get_attribute_value, get_xyt_attribute, set_attribute, AttributeKey,
    Engine, Info,
};
use prodrisk_core::{Datatype, ProdriskResult, Value};

/// Getter and setter bound to one attribute of one object.
pub struct AttributeProxy {
    engine: Rc<dyn Engine>,
    object_type: String,
    object_name: String,
    name: String,
    datatype: Datatype,
}

impl fmt::Debug for AttributeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeProxy({}: {})", self.key(), self.datatype)
    }
}

impl AttributeProxy {
    pub(crate) fn new(
        engine: Rc<dyn Engine>,
        object_type: &str,
        object_name: &str,
        name: &str,
        datatype: Datatype,
    ) -> Self {
        Self {
            engine,
            object_type: object_type.to_string(),
            object_name: object_name.to_string(),
            name: name.to_string(),
            datatype,
        }
    }

    pub fn key(&self) -> AttributeKey<'_> {
        AttributeKey::new(&self.object_type, &self.object_name, &self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    pub fn get(&self) -> ProdriskResult<Option<Value>> {
        get_attribute_value(self.engine.as_ref(), &self.key(), &self.datatype)
    }

    /// Read an xyt attribute within `[start, end]`. Other datatypes ignore
    /// the window and read as [`get`](Self::get).
    pub fn get_window(&self, start: NaiveDateTime, end: NaiveDateTime) -> ProdriskResult<Option<Value>> {
        if self.datatype != Datatype::Xyt {
            return self.get();
        }
        Ok(get_xyt_attribute(self.engine.as_ref(), &self.key(), start, end)?.map(Value::Xyt))
    }

    pub fn set(&self, value: impl Into<Value>) -> ProdriskResult<()> {
        set_attribute(self.engine.as_ref(), &self.key(), &self.datatype, value.into())
    }

    /// All metadata entries of the attribute.
    pub fn info(&self) -> ProdriskResult<Info> {
        get_attribute_info(self.engine.as_ref(), &self.object_type, &self.name, None)
    }

    /// The attribute's description text.
    pub fn help(&self) -> ProdriskResult<String> {
        self.engine
            .attribute_info(&self.object_type, &self.name, "description")
    }
}
