use crate::model::Model;
use crate::schema::is_whole_i32;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, PartialEq, StrumDisplay)]
pub enum ArgumentType {
    Boolean,
    Double,
    Integer,
    String,
    Choice,
    Path,
    Separator,
}

#[derive(Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, PartialEq, StrumDisplay)]
pub enum DomainType {
    Interval,
    Enumeration,
}

/// A value held by an [`Argument`], either as its current value, its default, or as a member of
/// its domain.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ArgumentValue {
    #[default]
    Empty,
    Bool(bool),
    Double(f64),
    Integer(i32),
    String(String),
    Path(PathBuf),
}

impl ArgumentValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, ArgumentValue::Empty)
    }
}

impl Display for ArgumentValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentValue::Empty => Ok(()),
            ArgumentValue::Bool(value) => write!(f, "{value}"),
            ArgumentValue::Double(value) => write!(f, "{value}"),
            ArgumentValue::Integer(value) => write!(f, "{value}"),
            ArgumentValue::String(value) => write!(f, "{value}"),
            ArgumentValue::Path(value) => write!(f, "{}", value.display()),
        }
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Bool(value)
    }
}

impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        ArgumentValue::Double(value)
    }
}

impl From<i32> for ArgumentValue {
    fn from(value: i32) -> Self {
        ArgumentValue::Integer(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

impl From<PathBuf> for ArgumentValue {
    fn from(value: PathBuf) -> Self {
        ArgumentValue::Path(value)
    }
}

impl From<&Path> for ArgumentValue {
    fn from(value: &Path) -> Self {
        ArgumentValue::Path(value.to_path_buf())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ArgumentError {
    #[error("Argument '{name}' of type {argument_type} cannot hold the value '{value}'")]
    TypeMismatch {
        name: String,
        argument_type: ArgumentType,
        value: String,
    },
    #[error("Argument '{name}' is of type {argument_type}, not of type {requested}")]
    WrongType {
        name: String,
        argument_type: ArgumentType,
        requested: ArgumentType,
    },
    #[error("Argument '{0}' has no value")]
    NoValue(String),
    #[error("Argument '{0}' has no default value")]
    NoDefaultValue(String),
    #[error("No domain set for argument '{0}'")]
    NoDomain(String),
    #[error("Domain type {domain_type} does not make sense for arguments of type {argument_type}, such as '{name}'")]
    InvalidDomainType {
        name: String,
        domain_type: DomainType,
        argument_type: ArgumentType,
    },
    #[error("An interval domain for argument '{name}' needs exactly 2 values, got {found}")]
    IntervalSize { name: String, found: usize },
}

/// A typed, named, optionally constrained input used to parameterise a measure interactively.
///
/// Cloning with [`Clone`] keeps the identity; use [`Argument::clone_with_new_identity`] to reuse
/// an argument elsewhere. Every change refreshes the version identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    uuid: Uuid,
    version_uuid: Uuid,
    name: String,
    display_name: String,
    description: Option<String>,
    argument_type: ArgumentType,
    units: Option<String>,
    required: bool,
    model_dependent: bool,
    value: ArgumentValue,
    default_value: ArgumentValue,
    domain_type: DomainType,
    domain: Vec<ArgumentValue>,
    choices: Vec<String>,
    choice_display_names: Vec<String>,
    is_read: bool,
    extension: String,
}

impl Argument {
    fn new(name: &str, argument_type: ArgumentType, required: bool) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            version_uuid: Uuid::new_v4(),
            name: name.to_string(),
            display_name: name.to_string(),
            description: None,
            argument_type,
            units: None,
            required,
            model_dependent: false,
            value: ArgumentValue::Empty,
            default_value: ArgumentValue::Empty,
            domain_type: DomainType::Enumeration,
            domain: vec![],
            choices: vec![],
            choice_display_names: vec![],
            is_read: false,
            extension: String::new(),
        }
    }

    pub fn make_bool_argument(name: &str, required: bool) -> Self {
        let mut argument = Self::new(name, ArgumentType::Boolean, required);
        argument.choices = vec!["true".into(), "false".into()];
        argument
    }

    pub fn make_double_argument(name: &str, required: bool) -> Self {
        let mut argument = Self::new(name, ArgumentType::Double, required);
        argument.domain_type = DomainType::Interval;
        argument
    }

    pub fn make_integer_argument(name: &str, required: bool) -> Self {
        let mut argument = Self::new(name, ArgumentType::Integer, required);
        argument.domain_type = DomainType::Interval;
        argument
    }

    pub fn make_string_argument(name: &str, required: bool) -> Self {
        Self::new(name, ArgumentType::String, required)
    }

    /// A choice argument whose display names are the values themselves.
    pub fn make_choice_argument(name: &str, choices: &[&str], required: bool) -> Self {
        Self::make_choice_argument_with_display_names(name, choices, choices, required)
    }

    /// `display_names` pairs index-wise with `choices` and may be shorter.
    pub fn make_choice_argument_with_display_names(
        name: &str,
        choices: &[&str],
        display_names: &[&str],
        required: bool,
    ) -> Self {
        let mut argument = Self::new(name, ArgumentType::Choice, required);
        argument.choices = choices.iter().map(|c| c.to_string()).collect();
        argument.choice_display_names = display_names.iter().map(|d| d.to_string()).collect();
        argument
    }

    pub fn make_path_argument(name: &str, is_read: bool, extension: &str, required: bool) -> Self {
        let mut argument = Self::new(name, ArgumentType::Path, required);
        argument.is_read = is_read;
        argument.extension = extension.to_string();
        argument
    }

    pub fn make_separator_argument(name: &str) -> Self {
        Self::new(name, ArgumentType::Separator, false)
    }

    /// Marks the argument as depending on the model it is applied to.
    pub fn model_dependent(mut self) -> Self {
        self.model_dependent = true;
        self
    }

    /// A copy with fresh identities.
    pub fn clone_with_new_identity(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            version_uuid: Uuid::new_v4(),
            ..self.clone()
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn version_uuid(&self) -> Uuid {
        self.version_uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn argument_type(&self) -> ArgumentType {
        self.argument_type
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn is_model_dependent(&self) -> bool {
        self.model_dependent
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn choice_values(&self) -> &[String] {
        &self.choices
    }

    pub fn choice_value_display_names(&self) -> &[String] {
        &self.choice_display_names
    }

    pub fn set_display_name(&mut self, display_name: &str) {
        self.display_name = display_name.to_string();
        self.on_change();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
        self.on_change();
    }

    pub fn set_units(&mut self, units: &str) {
        self.units = Some(units.to_string());
        self.on_change();
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }

    pub fn value(&self) -> &ArgumentValue {
        &self.value
    }

    /// Sets the current value. Besides values of the argument's own type, an integer is accepted
    /// by a Double argument, a whole-number double by an Integer argument, and text is read
    /// according to the argument's type.
    pub fn set_value(&mut self, value: impl Into<ArgumentValue>) -> Result<(), ArgumentError> {
        self.value = self.coerce(value.into())?;
        self.on_change();
        Ok(())
    }

    pub fn clear_value(&mut self) {
        self.value = ArgumentValue::Empty;
        self.on_change();
    }

    pub fn value_as_bool(&self) -> Result<bool, ArgumentError> {
        match self.typed(&self.value, ArgumentType::Boolean, false)? {
            ArgumentValue::Bool(value) => Ok(*value),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn value_as_double(&self) -> Result<f64, ArgumentError> {
        match self.typed(&self.value, ArgumentType::Double, false)? {
            ArgumentValue::Double(value) => Ok(*value),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn value_as_integer(&self) -> Result<i32, ArgumentError> {
        match self.typed(&self.value, ArgumentType::Integer, false)? {
            ArgumentValue::Integer(value) => Ok(*value),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn value_as_path(&self) -> Result<&Path, ArgumentError> {
        match self.typed(&self.value, ArgumentType::Path, false)? {
            ArgumentValue::Path(value) => Ok(value.as_path()),
            other => Err(self.mismatch(other)),
        }
    }

    /// The current value as text, whatever the argument's type.
    pub fn value_as_string(&self) -> Result<String, ArgumentError> {
        if !self.has_value() {
            return Err(ArgumentError::NoValue(self.name.clone()));
        }
        Ok(self.value.to_string())
    }

    /// The display name of the current choice, or the value text when it has none.
    pub fn value_display_name(&self) -> Result<String, ArgumentError> {
        Ok(self.choice_display_name(self.value_as_string()?))
    }

    pub fn has_default_value(&self) -> bool {
        !self.default_value.is_empty()
    }

    pub fn default_value(&self) -> &ArgumentValue {
        &self.default_value
    }

    pub fn set_default_value(
        &mut self,
        default_value: impl Into<ArgumentValue>,
    ) -> Result<(), ArgumentError> {
        self.default_value = self.coerce(default_value.into())?;
        self.on_change();
        Ok(())
    }

    pub fn default_value_as_bool(&self) -> Result<bool, ArgumentError> {
        match self.typed(&self.default_value, ArgumentType::Boolean, true)? {
            ArgumentValue::Bool(value) => Ok(*value),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn default_value_as_double(&self) -> Result<f64, ArgumentError> {
        match self.typed(&self.default_value, ArgumentType::Double, true)? {
            ArgumentValue::Double(value) => Ok(*value),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn default_value_as_integer(&self) -> Result<i32, ArgumentError> {
        match self.typed(&self.default_value, ArgumentType::Integer, true)? {
            ArgumentValue::Integer(value) => Ok(*value),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn default_value_as_string(&self) -> Result<String, ArgumentError> {
        if !self.has_default_value() {
            return Err(ArgumentError::NoDefaultValue(self.name.clone()));
        }
        Ok(self.default_value.to_string())
    }

    pub fn default_value_display_name(&self) -> Result<String, ArgumentError> {
        Ok(self.choice_display_name(self.default_value_as_string()?))
    }

    pub fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    pub fn has_domain(&self) -> bool {
        !self.domain.is_empty()
    }

    pub fn domain(&self) -> &[ArgumentValue] {
        &self.domain
    }

    /// Changing the domain type clears the current domain. An interval only makes sense for
    /// numeric arguments.
    pub fn set_domain_type(&mut self, domain_type: DomainType) -> Result<(), ArgumentError> {
        if domain_type == self.domain_type {
            return Ok(());
        }
        if domain_type == DomainType::Interval && !self.is_numeric() {
            info!(
                "Domain type {domain_type} does not make sense for arguments of type {}, such as {}",
                self.argument_type, self.name
            );
            return Err(ArgumentError::InvalidDomainType {
                name: self.name.clone(),
                domain_type,
                argument_type: self.argument_type,
            });
        }
        self.domain_type = domain_type;
        self.domain.clear();
        self.on_change();
        Ok(())
    }

    /// Replaces the domain. Every value must fit the argument's type, otherwise the domain is left
    /// as it was. An interval domain takes exactly a minimum and a maximum.
    pub fn set_domain<T: Into<ArgumentValue>>(
        &mut self,
        domain: impl IntoIterator<Item = T>,
    ) -> Result<(), ArgumentError> {
        let domain = domain
            .into_iter()
            .map(|value| self.coerce(value.into()))
            .collect::<Result<Vec<_>, _>>()?;
        if self.domain_type == DomainType::Interval && domain.len() != 2 {
            return Err(ArgumentError::IntervalSize {
                name: self.name.clone(),
                found: domain.len(),
            });
        }
        self.domain = domain;
        self.on_change();
        Ok(())
    }

    pub fn clear_domain(&mut self) {
        self.domain.clear();
        self.on_change();
    }

    pub fn domain_as_double(&self) -> Result<Vec<f64>, ArgumentError> {
        self.domain_of(ArgumentType::Double, |value| match value {
            ArgumentValue::Double(value) => Some(*value),
            _ => None,
        })
    }

    pub fn domain_as_integer(&self) -> Result<Vec<i32>, ArgumentError> {
        self.domain_of(ArgumentType::Integer, |value| match value {
            ArgumentValue::Integer(value) => Some(*value),
            _ => None,
        })
    }

    pub fn domain_as_bool(&self) -> Result<Vec<bool>, ArgumentError> {
        self.domain_of(ArgumentType::Boolean, |value| match value {
            ArgumentValue::Bool(value) => Some(*value),
            _ => None,
        })
    }

    pub fn domain_as_string(&self) -> Result<Vec<String>, ArgumentError> {
        if !self.has_domain() {
            return Err(ArgumentError::NoDomain(self.name.clone()));
        }
        Ok(self.domain.iter().map(ToString::to_string).collect())
    }

    /// Sets the lower bound of an interval domain, keeping an existing upper bound. A whole-number
    /// bound is accepted for Integer arguments.
    pub fn set_min_value(&mut self, min: f64) -> Result<(), ArgumentError> {
        let (min, max) = match self.argument_type {
            ArgumentType::Double => {
                let max = self.interval_bound(1).unwrap_or(ArgumentValue::Double(f64::MAX));
                (ArgumentValue::Double(min), max)
            }
            ArgumentType::Integer if is_whole_i32(min) => {
                let max = self
                    .interval_bound(1)
                    .unwrap_or(ArgumentValue::Integer(i32::MAX));
                (ArgumentValue::Integer(min as i32), max)
            }
            ArgumentType::Integer => return Err(self.mismatch(&ArgumentValue::Double(min))),
            ArgumentType::Boolean
            | ArgumentType::String
            | ArgumentType::Choice
            | ArgumentType::Path
            | ArgumentType::Separator => return Err(self.wrong_type(ArgumentType::Double)),
        };
        self.set_interval(min, max);
        Ok(())
    }

    /// Sets the upper bound of an interval domain, keeping an existing lower bound.
    pub fn set_max_value(&mut self, max: f64) -> Result<(), ArgumentError> {
        let (min, max) = match self.argument_type {
            ArgumentType::Double => {
                let min = self.interval_bound(0).unwrap_or(ArgumentValue::Double(f64::MIN));
                (min, ArgumentValue::Double(max))
            }
            ArgumentType::Integer if is_whole_i32(max) => {
                let min = self
                    .interval_bound(0)
                    .unwrap_or(ArgumentValue::Integer(i32::MIN));
                (min, ArgumentValue::Integer(max as i32))
            }
            ArgumentType::Integer => return Err(self.mismatch(&ArgumentValue::Double(max))),
            ArgumentType::Boolean
            | ArgumentType::String
            | ArgumentType::Choice
            | ArgumentType::Path
            | ArgumentType::Separator => return Err(self.wrong_type(ArgumentType::Double)),
        };
        self.set_interval(min, max);
        Ok(())
    }

    /// A multi-line human-readable rendering of the argument.
    pub fn print(&self) -> String {
        let mut out = self.name.clone();
        if !self.display_name.is_empty() {
            out.push_str(&format!(" ({})", self.display_name));
        }
        out.push('\n');

        let requirement = if self.required { "Required" } else { "Optional" };
        out.push_str(&format!("{}, {requirement}\n", self.argument_type));

        out.push_str("Value: ");
        if self.has_value() {
            out.push_str(&format!("{} ", self.value));
        }
        if self.has_default_value() {
            out.push_str(&format!("({})", self.default_value));
        }
        out.push('\n');

        if self.argument_type == ArgumentType::Choice {
            out.push_str("Choices:\n");
            for (index, choice) in self.choices.iter().enumerate() {
                out.push_str(&format!("  {choice}"));
                match self.choice_display_names.get(index) {
                    Some(display_name) if !display_name.is_empty() => {
                        out.push_str(&format!(" ({display_name})"))
                    }
                    _ => {}
                }
                out.push('\n');
            }
        }

        if self.has_domain() {
            out.push_str(&format!("{} Domain: ", self.domain_type));
            match self.domain_type {
                DomainType::Interval => {
                    out.push_str(&format!("[{}, {}]\n", self.domain[0], self.domain[1]))
                }
                DomainType::Enumeration => {
                    out.push('\n');
                    for value in &self.domain {
                        out.push_str(&format!("  {value}\n"));
                    }
                }
            }
        }

        out
    }

    fn on_change(&mut self) {
        self.version_uuid = Uuid::new_v4();
    }

    fn is_numeric(&self) -> bool {
        match self.argument_type {
            ArgumentType::Double | ArgumentType::Integer | ArgumentType::Separator => true,
            ArgumentType::Boolean
            | ArgumentType::String
            | ArgumentType::Choice
            | ArgumentType::Path => false,
        }
    }

    /// Converts a value to one this argument can hold, applying the sanctioned numeric coercions
    /// and reading text according to the argument's type.
    fn coerce(&self, value: ArgumentValue) -> Result<ArgumentValue, ArgumentError> {
        let coerced = match (self.argument_type, &value) {
            (ArgumentType::Boolean, ArgumentValue::Bool(_))
            | (ArgumentType::Double, ArgumentValue::Double(_))
            | (ArgumentType::Integer, ArgumentValue::Integer(_))
            | (ArgumentType::Path, ArgumentValue::Path(_))
            | (ArgumentType::String, ArgumentValue::String(_)) => Some(value.clone()),
            (ArgumentType::Double, ArgumentValue::Integer(int)) => {
                Some(ArgumentValue::Double(*int as f64))
            }
            (ArgumentType::Integer, ArgumentValue::Double(real)) if is_whole_i32(*real) => {
                Some(ArgumentValue::Integer(*real as i32))
            }
            (_, ArgumentValue::String(text)) => self.parse_text(text),
            _ => None,
        };

        coerced.ok_or_else(|| self.mismatch(&value))
    }

    fn parse_text(&self, text: &str) -> Option<ArgumentValue> {
        match self.argument_type {
            ArgumentType::Boolean => match text {
                "true" => Some(ArgumentValue::Bool(true)),
                "false" => Some(ArgumentValue::Bool(false)),
                _ => None,
            },
            ArgumentType::Double => text.trim().parse().ok().map(ArgumentValue::Double),
            ArgumentType::Integer => text.trim().parse().ok().map(ArgumentValue::Integer),
            ArgumentType::String => Some(ArgumentValue::String(text.to_string())),
            ArgumentType::Choice => self
                .choices
                .iter()
                .find(|choice| *choice == text)
                .or_else(|| {
                    let index = self.choice_display_names.iter().position(|d| d == text)?;
                    self.choices.get(index)
                })
                .map(|choice| ArgumentValue::String(choice.clone())),
            ArgumentType::Path => Some(ArgumentValue::Path(PathBuf::from(text))),
            ArgumentType::Separator => None,
        }
    }

    fn choice_display_name(&self, value: String) -> String {
        self.choices
            .iter()
            .position(|choice| *choice == value)
            .and_then(|index| self.choice_display_names.get(index))
            .cloned()
            .unwrap_or(value)
    }

    fn typed<'a>(
        &self,
        value: &'a ArgumentValue,
        requested: ArgumentType,
        is_default: bool,
    ) -> Result<&'a ArgumentValue, ArgumentError> {
        if value.is_empty() {
            return Err(if is_default {
                ArgumentError::NoDefaultValue(self.name.clone())
            } else {
                ArgumentError::NoValue(self.name.clone())
            });
        }
        if self.argument_type != requested {
            return Err(self.wrong_type(requested));
        }
        Ok(value)
    }

    fn domain_of<T>(
        &self,
        requested: ArgumentType,
        extract: impl Fn(&ArgumentValue) -> Option<T>,
    ) -> Result<Vec<T>, ArgumentError> {
        if !self.has_domain() {
            return Err(ArgumentError::NoDomain(self.name.clone()));
        }
        if self.argument_type != requested {
            return Err(self.wrong_type(requested));
        }
        self.domain
            .iter()
            .map(|value| extract(value).ok_or_else(|| self.mismatch(value)))
            .collect()
    }

    fn interval_bound(&self, position: usize) -> Option<ArgumentValue> {
        if self.domain_type == DomainType::Interval && self.domain.len() == 2 {
            Some(self.domain[position].clone())
        } else {
            None
        }
    }

    fn set_interval(&mut self, min: ArgumentValue, max: ArgumentValue) {
        self.domain_type = DomainType::Interval;
        self.domain = vec![min, max];
        self.on_change();
    }

    fn mismatch(&self, value: &ArgumentValue) -> ArgumentError {
        ArgumentError::TypeMismatch {
            name: self.name.clone(),
            argument_type: self.argument_type,
            value: value.to_string(),
        }
    }

    fn wrong_type(&self, requested: ArgumentType) -> ArgumentError {
        ArgumentError::WrongType {
            name: self.name.clone(),
            argument_type: self.argument_type,
            requested,
        }
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.print())
    }
}

/// A choice argument listing the model's objects of one type: handles as values, names as
/// display names, sorted by display name.
pub fn make_choice_argument_of_model_objects(
    name: &str,
    object_type: &str,
    model: &Model,
    required: bool,
) -> Argument {
    let mut pairs = model
        .objects_by_type(object_type)
        .into_iter()
        .map(|object| {
            (
                object.handle().to_string(),
                object.name().unwrap_or(object.object_type()).to_string(),
            )
        })
        .collect::<Vec<_>>();
    pairs.sort_by(|a, b| a.1.cmp(&b.1));

    let choices = pairs.iter().map(|(handle, _)| handle.as_str()).collect::<Vec<_>>();
    let display_names = pairs.iter().map(|(_, name)| name.as_str()).collect::<Vec<_>>();
    Argument::make_choice_argument_with_display_names(name, &choices, &display_names, required)
}

/// Clones each argument (with a new identity) into a map keyed by name. The first argument of a
/// given name wins.
pub fn convert_argument_vector_to_map(arguments: &[Argument]) -> IndexMap<String, Argument> {
    let mut map = IndexMap::new();
    for argument in arguments {
        map.entry(argument.name().to_string())
            .or_insert_with(|| argument.clone_with_new_identity());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin::WATER_HEATER_MIXED;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(3, 3.)]
    #[case(-2, -2.)]
    fn should_accept_integers_for_double_arguments(#[case] input: i32, #[case] expected: f64) {
        let mut argument = Argument::make_double_argument("ratio", true);
        argument.set_value(input).unwrap();
        assert_relative_eq!(argument.value_as_double().unwrap(), expected);
    }

    #[rstest]
    fn should_accept_whole_doubles_for_integer_arguments() {
        let mut argument = Argument::make_integer_argument("count", true);
        argument.set_value(1.0).unwrap();
        assert_eq!(argument.value_as_integer().unwrap(), 1);

        assert!(matches!(
            argument.set_value(1.5),
            Err(ArgumentError::TypeMismatch { .. })
        ));
        assert_eq!(argument.value_as_integer().unwrap(), 1);
    }

    #[rstest]
    fn should_reject_values_of_another_type() {
        let mut argument = Argument::make_bool_argument("flag", false);
        assert!(argument.set_value(1).is_err());
        assert!(argument.set_value("yes").is_err());
        argument.set_value("true").unwrap();
        assert!(argument.value_as_bool().unwrap());
        assert!(matches!(
            argument.value_as_double(),
            Err(ArgumentError::WrongType { .. })
        ));
    }

    #[rstest]
    fn should_read_text_by_argument_type() {
        let mut double = Argument::make_double_argument("ratio", true);
        double.set_value("0.25").unwrap();
        assert_relative_eq!(double.value_as_double().unwrap(), 0.25);

        let mut path = Argument::make_path_argument("weather", true, "epw", true);
        path.set_value("in/weather.epw").unwrap();
        assert_eq!(path.value_as_path().unwrap(), Path::new("in/weather.epw"));
        assert!(path.is_read());
        assert_eq!(path.extension(), "epw");
    }

    #[fixture]
    fn mode() -> Argument {
        Argument::make_choice_argument_with_display_names(
            "mode",
            &["PeakDraw", "PerPerson", "PerUnit"],
            &["Peak Draw", "Per Person"],
            true,
        )
    }

    #[rstest]
    fn should_set_choices_by_value_or_display_name(mut mode: Argument) {
        mode.set_value("Per Person").unwrap();
        assert_eq!(mode.value_as_string().unwrap(), "PerPerson");
        assert_eq!(mode.value_display_name().unwrap(), "Per Person");

        mode.set_value("PerUnit").unwrap();
        assert_eq!(mode.value_display_name().unwrap(), "PerUnit");

        assert!(mode.set_value("perperson").is_err());
    }

    #[rstest]
    fn should_print_choice_argument(mut mode: Argument) {
        mode.set_display_name("Design Mode");
        mode.set_value("PerPerson").unwrap();
        mode.set_default_value("PeakDraw").unwrap();

        assert_eq!(
            mode.print(),
            "mode (Design Mode)\n\
             Choice, Required\n\
             Value: PerPerson (PeakDraw)\n\
             Choices:\n  \
             PeakDraw (Peak Draw)\n  \
             PerPerson (Per Person)\n  \
             PerUnit\n"
        );
    }

    #[rstest]
    fn should_print_interval_domain() {
        let mut argument = Argument::make_double_argument("ratio", false);
        argument.set_default_value(3).unwrap();
        argument.set_min_value(0.5).unwrap();
        argument.set_max_value(4.).unwrap();

        assert_eq!(
            argument.to_string(),
            "ratio (ratio)\nDouble, Optional\nValue: (3)\nInterval Domain: [0.5, 4]\n"
        );
    }

    #[rstest]
    fn should_print_enumeration_domain() {
        let mut argument = Argument::make_string_argument("fuel", true);
        argument.set_domain(["Electricity", "NaturalGas"]).unwrap();
        argument.set_value("Electricity").unwrap();

        assert_eq!(
            argument.print(),
            "fuel (fuel)\nString, Required\nValue: Electricity \n\
             Enumeration Domain: \n  Electricity\n  NaturalGas\n"
        );
    }

    #[rstest]
    #[case(ArgumentType::Boolean)]
    #[case(ArgumentType::String)]
    #[case(ArgumentType::Choice)]
    #[case(ArgumentType::Path)]
    fn should_reject_interval_domains_for_non_numeric_types(#[case] argument_type: ArgumentType) {
        let mut argument = match argument_type {
            ArgumentType::Boolean => Argument::make_bool_argument("a", true),
            ArgumentType::String => Argument::make_string_argument("a", true),
            ArgumentType::Choice => Argument::make_choice_argument("a", &["x"], true),
            ArgumentType::Path => Argument::make_path_argument("a", false, "idf", true),
            ArgumentType::Double | ArgumentType::Integer | ArgumentType::Separator => {
                unreachable!()
            }
        };
        assert!(matches!(
            argument.set_domain_type(DomainType::Interval),
            Err(ArgumentError::InvalidDomainType { .. })
        ));
        assert_eq!(argument.domain_type(), DomainType::Enumeration);
    }

    #[rstest]
    fn should_keep_existing_bounds_when_setting_the_other_one() {
        let mut argument = Argument::make_integer_argument("count", true);
        argument.set_max_value(10.).unwrap();
        assert_eq!(argument.domain_as_integer().unwrap(), vec![i32::MIN, 10]);
        argument.set_min_value(1.).unwrap();
        assert_eq!(argument.domain_as_integer().unwrap(), vec![1, 10]);
        assert!(argument.set_min_value(1.5).is_err());
    }

    #[rstest]
    fn should_require_two_values_for_interval_domain() {
        let mut argument = Argument::make_double_argument("ratio", true);
        assert_eq!(
            argument.set_domain([1.]),
            Err(ArgumentError::IntervalSize {
                name: "ratio".into(),
                found: 1
            })
        );
        argument.set_domain([1, 2]).unwrap();
        assert_eq!(argument.domain_as_double().unwrap(), vec![1., 2.]);
    }

    #[rstest]
    fn should_refresh_version_on_change_and_identity_on_clone() {
        let mut argument = Argument::make_string_argument("label", false);
        let version = argument.version_uuid();
        argument.set_value("x").unwrap();
        assert_ne!(argument.version_uuid(), version);

        let clone = argument.clone_with_new_identity();
        assert_ne!(clone.uuid(), argument.uuid());
        assert_eq!(clone.value_as_string().unwrap(), "x");
    }

    #[rstest]
    fn should_list_model_objects_sorted_by_name() {
        let mut model = Model::new();
        let zeta = model.add_object(WATER_HEATER_MIXED).unwrap();
        model.set_name(zeta, "Zeta").unwrap();
        let alpha = model.add_object(WATER_HEATER_MIXED).unwrap();
        model.set_name(alpha, "Alpha").unwrap();

        let argument =
            make_choice_argument_of_model_objects("heater", WATER_HEATER_MIXED, &model, true);
        assert_eq!(argument.choice_value_display_names(), &["Alpha", "Zeta"]);
        assert_eq!(argument.choice_values()[0], alpha.to_string());
    }

    #[rstest]
    fn should_convert_arguments_to_map_of_clones() {
        let first = Argument::make_string_argument("a", true);
        let duplicate = Argument::make_double_argument("a", true);
        let second = Argument::make_bool_argument("b", true);
        let map = convert_argument_vector_to_map(&[first.clone(), duplicate, second]);

        assert_eq!(map.len(), 2);
        assert_eq!(map["a"].argument_type(), ArgumentType::String);
        assert_ne!(map["a"].uuid(), first.uuid());
    }
}
