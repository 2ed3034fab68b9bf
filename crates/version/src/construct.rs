use crate::error::{Error, ErrorKind};
use crate::{MAX_COMPONENT, MAX_COMPONENTS, MIN_COMPONENTS, Version};
use exn::OptionExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

impl FromStr for Version {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            exn::bail!(ErrorKind::Empty);
        }
        let segments = s.split('.').count();
        if !(MIN_COMPONENTS..=MAX_COMPONENTS).contains(&segments) {
            exn::bail!(ErrorKind::ComponentCount(segments));
        }
        let mut parts = [0; MAX_COMPONENTS];
        for (slot, segment) in parts.iter_mut().zip(s.split('.')) {
            *slot = parse_component(segment)?;
        }
        // Fits: bounded by MAX_COMPONENTS above.
        Ok(Self { parts, len: segments as u8 })
    }
}

/// Parse one component. Only plain ASCII digits are accepted, so signs,
/// whitespace and empty segments (`1..2`) are all rejected.
fn parse_component(segment: &str) -> Result<u32, Error> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        exn::bail!(ErrorKind::InvalidComponent(segment.to_string()));
    }
    segment
        .parse::<u32>()
        .ok()
        .filter(|value| *value <= MAX_COMPONENT)
        .ok_or_raise(|| ErrorKind::InvalidComponent(segment.to_string()))
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut components = self.components().iter();
        if let Some(first) = components.next() {
            write!(f, "{first}")?;
        }
        for component in components {
            write!(f, ".{component}")?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
