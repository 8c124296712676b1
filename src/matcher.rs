use std::cmp::Ordering;
use std::fmt;

use either::Either;
use fp_core::empty::Empty;
use fp_core::monoid::Monoid;
use fp_core::semigroup::Semigroup;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use yasi::InternedString;

use crate::version::Version;

#[derive(Clone, Debug)]
pub enum ParseError {
    InvalidConstraint(String, Option<pest::error::Error<Rule>>),
    InvalidRequirement(String, Option<pest::error::Error<Rule>>),
    InvalidExpression(String, Box<ParseError>, Box<ParseError>),
}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidConstraint(input, error) => {
                write!(f, "Parse Error: {input:?} is not a valid constraint")?;
                if let Some(error) = error {
                    write!(f, ": {error}")?;
                }
                Ok(())
            }
            ParseError::InvalidRequirement(input, error) => {
                write!(f, "Parse Error: {input:?} is not a valid requirement")?;
                if let Some(error) = error {
                    write!(f, ": {error}")?;
                }
                Ok(())
            }
            ParseError::InvalidExpression(input, constraint, requirement) => {
                write!(
                    f,
                    "Parse Error: {input:?} is neither a constraint nor a requirement: {constraint}; {requirement}"
                )
            }
        }
    }
}
impl std::error::Error for ParseError {}

// Left is inversion, Right is identity
type Invertable<T> = Result<T, T>;
pub type Operator = Invertable<Ordering>;
pub const GTE: Operator = Err(Ordering::Less);
pub const LT: Operator = Ok(Ordering::Less);
pub const NEQ: Operator = Err(Ordering::Equal);
pub const EQ: Operator = Ok(Ordering::Equal);
pub const LTE: Operator = Err(Ordering::Greater);
pub const GT: Operator = Ok(Ordering::Greater);

/// The evaluated form shared by both expression languages: a boolean
/// combination of comparisons against anchor versions.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Anchor(Operator, Version),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Any,
    None,
}
impl Predicate {
    /// satisfied by any version
    pub fn any() -> Self {
        Self::Any
    }
    /// unsatisfiable
    pub fn none() -> Self {
        Self::None
    }
    /// defined in relation to a specific version
    pub fn anchor(op: Operator, version: Version) -> Self {
        Self::Anchor(op, version)
    }

    pub fn exactly(version: Version) -> Self {
        Self::Anchor(EQ, version)
    }

    /// smart constructor for And, eagerly evaluates identities and annihilators
    pub fn and(a: Self, b: Self) -> Self {
        use Predicate::*;
        match (a, b) {
            (Any, b) => b,
            (a, Any) => a,
            (None, _) => None,
            (_, None) => None,
            (a, b) => And(Box::new(a), Box::new(b)),
        }
    }
    /// smart constructor for Or, eagerly evaluates identities and annihilators
    pub fn or(a: Self, b: Self) -> Self {
        use Predicate::*;
        match (a, b) {
            (Any, _) => Any,
            (_, Any) => Any,
            (None, b) => b,
            (a, None) => a,
            (a, b) => Or(Box::new(a), Box::new(b)),
        }
    }

    /// Decides whether the 'Version' satisfies this predicate
    pub fn check(&self, version: &Version) -> bool {
        use Predicate::*;
        match self {
            Anchor(op, anchor) => match op {
                Ok(expected) => version.cmp(anchor) == *expected,
                Err(excluded) => version.cmp(anchor) != *excluded,
            },
            And(a, b) => a.check(version) && b.check(version),
            Or(a, b) => a.check(version) || b.check(version),
            Any => true,
            None => false,
        }
    }
}
impl Default for Predicate {
    fn default() -> Self {
        Predicate::Any
    }
}

pub struct AnyOf(Predicate);
impl Semigroup for AnyOf {
    fn combine(self, other: Self) -> Self {
        AnyOf(Predicate::or(self.0, other.0))
    }
}
impl Empty for AnyOf {
    fn empty() -> Self {
        AnyOf(Predicate::None)
    }
}
impl Monoid for AnyOf {}

pub struct AllOf(Predicate);
impl Semigroup for AllOf {
    fn combine(self, other: Self) -> Self {
        AllOf(Predicate::and(self.0, other.0))
    }
}
impl Empty for AllOf {
    fn empty() -> Self {
        AllOf(Predicate::Any)
    }
}
impl Monoid for AllOf {}

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct Grammar;

fn operator_for(rule: Rule) -> Option<Operator> {
    match rule {
        Rule::gte | Rule::alt_gte => Some(GTE),
        Rule::lte | Rule::alt_lte => Some(LTE),
        Rule::eq | Rule::eq_strict => Some(EQ),
        Rule::neq => Some(NEQ),
        Rule::gt => Some(GT),
        Rule::lt => Some(LT),
        _ => None,
    }
}

fn parse_term(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let input = pair.as_span().as_str();
    let err_fn = || ParseError::InvalidConstraint(input.to_owned(), None);

    let mut op = None;
    let mut version = None;
    for tok in pair.into_inner() {
        match tok.as_rule() {
            Rule::cmp_op => {
                op = operator_for(tok.into_inner().next().ok_or_else(err_fn)?.as_rule());
            }
            Rule::version => version = Some(Version::from(tok.as_str())),
            _ => (),
        }
    }
    Ok(Predicate::anchor(
        op.ok_or_else(err_fn)?,
        version.ok_or_else(err_fn)?,
    ))
}

fn parse_constraint_group(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let mut all = AllOf::empty();
    for tok in pair.into_inner() {
        if let Rule::term = tok.as_rule() {
            all = all.combine(AllOf(parse_term(tok)?));
        }
    }
    Ok(all.0)
}

fn parse_constraint(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let mut any = AnyOf::empty();
    for tok in pair.into_inner() {
        if let Rule::constraint_group = tok.as_rule() {
            any = any.combine(AnyOf(parse_constraint_group(tok)?));
        }
    }
    Ok(any.0)
}

fn parse_interval(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let input = pair.as_span().as_str();
    let err_fn = || ParseError::InvalidRequirement(input.to_owned(), None);

    let mut lower_inclusive = true;
    let mut upper_inclusive = true;
    let mut body = None;
    for tok in pair.into_inner() {
        match tok.as_rule() {
            Rule::open => lower_inclusive = tok.as_str() == "[",
            Rule::close => upper_inclusive = tok.as_str() == "]",
            Rule::span | Rule::pinned => body = Some(tok),
            _ => (),
        }
    }
    let body = body.ok_or_else(err_fn)?;
    match body.as_rule() {
        // a single bracketed value pins the exact version, whatever the
        // bracket kind: `(1.0.0)` reads as `[1.0.0]`
        Rule::pinned => {
            let bound = body.into_inner().next().ok_or_else(err_fn)?;
            Ok(Predicate::exactly(Version::from(bound.as_str())))
        }
        Rule::span => {
            let mut lo = Predicate::Any;
            let mut hi = Predicate::Any;
            for tok in body.into_inner() {
                match tok.as_rule() {
                    Rule::lower => {
                        if let Some(bound) = tok.into_inner().next() {
                            let op = if lower_inclusive { GTE } else { GT };
                            lo = Predicate::anchor(op, Version::from(bound.as_str()));
                        }
                    }
                    Rule::upper => {
                        if let Some(bound) = tok.into_inner().next() {
                            let op = if upper_inclusive { LTE } else { LT };
                            hi = Predicate::anchor(op, Version::from(bound.as_str()));
                        }
                    }
                    _ => (),
                }
            }
            Ok(Predicate::and(lo, hi))
        }
        _ => Err(err_fn()),
    }
}

fn parse_requirement(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let input = pair.as_span().as_str();
    for tok in pair.into_inner() {
        match tok.as_rule() {
            // bare requirements are advisory only, never enforced
            Rule::soft => return Ok(Predicate::Any),
            Rule::interval_seq => {
                let mut union = AnyOf::empty();
                for interval in tok.into_inner() {
                    if let Rule::interval = interval.as_rule() {
                        union = union.combine(AnyOf(parse_interval(interval)?));
                    }
                }
                return Ok(union.0);
            }
            _ => (),
        }
    }
    Err(ParseError::InvalidRequirement(input.to_owned(), None))
}

/// A comparator expression: `<op><version>` terms, AND within a clause,
/// clauses joined by `||`.
#[derive(Clone, Debug)]
pub struct Constraint {
    source: InternedString,
    predicate: Predicate,
}
impl Constraint {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn check(&self, version: &Version) -> bool {
        self.predicate.check(version)
    }
}
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
impl std::str::FromStr for Constraint {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pair = Grammar::parse(Rule::constraint, s)
            .map_err(|e| ParseError::InvalidConstraint(s.into(), Some(e)))?
            .next()
            .unwrap();
        Ok(Self {
            source: s.into(),
            predicate: parse_constraint(pair)?,
        })
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for Constraint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Constraint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A Maven-style requirement: bracketed intervals unioned by commas, or a
/// bare soft version.
#[derive(Clone, Debug)]
pub struct Requirement {
    source: InternedString,
    predicate: Predicate,
}
impl Requirement {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn check(&self, version: &Version) -> bool {
        self.predicate.check(version)
    }
}
impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
impl std::str::FromStr for Requirement {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pair = Grammar::parse(Rule::requirement, s)
            .map_err(|e| ParseError::InvalidRequirement(s.into(), Some(e)))?
            .next()
            .unwrap();
        Ok(Self {
            source: s.into(),
            predicate: parse_requirement(pair)?,
        })
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for Requirement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Requirement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The facade callers hand an arbitrary expression to: tries the
/// constraint language first, then the requirement language, and keeps
/// whichever parsed.
#[derive(Clone, Debug)]
pub struct Matcher {
    inner: Either<Constraint, Requirement>,
}
impl Matcher {
    pub fn check(&self, version: &Version) -> bool {
        match &self.inner {
            Either::Left(constraint) => constraint.check(version),
            Either::Right(requirement) => requirement.check(version),
        }
    }

    pub fn predicate(&self) -> &Predicate {
        match &self.inner {
            Either::Left(constraint) => constraint.predicate(),
            Either::Right(requirement) => requirement.predicate(),
        }
    }

    pub fn as_constraint(&self) -> Option<&Constraint> {
        self.inner.as_ref().left()
    }

    pub fn as_requirement(&self) -> Option<&Requirement> {
        self.inner.as_ref().right()
    }
}
impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Either::Left(constraint) => constraint.fmt(f),
            Either::Right(requirement) => requirement.fmt(f),
        }
    }
}
impl std::str::FromStr for Matcher {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let constraint = match s.parse::<Constraint>() {
            Ok(constraint) => {
                return Ok(Self {
                    inner: Either::Left(constraint),
                })
            }
            Err(e) => e,
        };
        let requirement = match s.parse::<Requirement>() {
            Ok(requirement) => {
                return Ok(Self {
                    inner: Either::Right(requirement),
                })
            }
            Err(e) => e,
        };
        Err(ParseError::InvalidExpression(
            s.into(),
            Box::new(constraint),
            Box::new(requirement),
        ))
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for Matcher {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}", self))
    }
}
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Matcher {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
