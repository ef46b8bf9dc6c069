// internal modules
use crate::error::{Error, Result};
use crate::utils::f;
use crate::xml::Element;

// external crates
use serde::Serialize;

/// Perturbed quantity of a differential tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeVariable {
    Density,
    NuclideDensity,
    Temperature,
}

impl DerivativeVariable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Density => "density",
            Self::NuclideDensity => "nuclide_density",
            Self::Temperature => "temperature",
        }
    }

    /// Only nuclide densities need to know which nuclide is perturbed
    pub fn needs_nuclide(&self) -> bool {
        matches!(self, Self::NuclideDensity)
    }
}

impl std::str::FromStr for DerivativeVariable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "density" => Ok(Self::Density),
            "nuclide_density" => Ok(Self::NuclideDensity),
            "temperature" => Ok(Self::Temperature),
            _ => Err(Error::Parse(f!("Unknown derivative variable \"{s}\""))),
        }
    }
}

impl std::fmt::Display for DerivativeVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derivative of a tally with respect to a material property
///
/// ```rust
/// # use meshtally::tally::{DerivativeVariable, TallyDerivative};
/// let derivative = TallyDerivative::new(
///     DerivativeVariable::NuclideDensity,
///     1,
///     Some("Li6".to_string()),
/// ).unwrap();
/// assert_eq!(derivative.nuclide(), Some("Li6"));
///
/// // a nuclide density derivative is meaningless without the nuclide
/// assert!(TallyDerivative::new(DerivativeVariable::NuclideDensity, 1, None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyDerivative {
    variable: DerivativeVariable,
    material: u32,
    nuclide: Option<String>,
}

impl TallyDerivative {
    pub fn new(variable: DerivativeVariable, material: u32, nuclide: Option<String>) -> Result<Self> {
        if variable.needs_nuclide() && nuclide.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Validation(f!(
                "A {variable} derivative requires a nuclide"
            )));
        }
        Ok(Self {
            variable,
            material,
            nuclide,
        })
    }

    pub fn variable(&self) -> DerivativeVariable {
        self.variable
    }

    /// Id of the perturbed material
    pub fn material(&self) -> u32 {
        self.material
    }

    pub fn nuclide(&self) -> Option<&str> {
        self.nuclide.as_deref()
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("derivative")
            .with_attribute("variable", self.variable)
            .with_attribute("material", self.material);

        if let Some(nuclide) = &self.nuclide {
            element = element.with_attribute("nuclide", nuclide);
        }
        element
    }

    pub fn from_element(element: &Element) -> Result<Self> {
        let variable: DerivativeVariable = element.required_attribute("variable")?.parse()?;
        let material: u32 = element.parse_required_attribute("material")?;
        let nuclide = element.attribute("nuclide").map(String::from);

        Self::new(variable, material, nuclide)
            .map_err(|e| Error::Parse(f!("Invalid <derivative>: {e}")))
    }
}
