//! Ordered stylesheet parameters

use serde::{Deserialize, Serialize};

/// A single name/value pair handed to an engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parameters without a usable name are kept for editing but never bound
    pub fn is_bound(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Ordered collection of parameters.
///
/// Duplicate names are allowed and passed through untouched; each engine
/// resolves them according to its own rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a set from declared names, all values empty
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: names
                .into_iter()
                .map(|name| Parameter::new(name, String::new()))
                .collect(),
        }
    }

    pub fn add(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Remove the parameter at `index`, returning it if it existed
    pub fn remove(&mut self, index: usize) -> Option<Parameter> {
        if index < self.params.len() {
            Some(self.params.remove(index))
        } else {
            None
        }
    }

    /// Rename the parameter at `index`; false when out of range
    pub fn rename<S: Into<String>>(&mut self, index: usize, name: S) -> bool {
        match self.params.get_mut(index) {
            Some(param) => {
                param.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Change the value of the parameter at `index`; false when out of range
    pub fn set_value<S: Into<String>>(&mut self, index: usize, value: S) -> bool {
        match self.params.get_mut(index) {
            Some(param) => {
                param.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Parameters that should reach an engine, in order, duplicates kept
    pub fn bound(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.is_bound())
    }
}

impl FromIterator<Parameter> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
