use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;

use itertools::EitherOrBoth;
use itertools::Itertools;
use smallvec::SmallVec;
use yasi::InternedString;

/// Qualifier precedence, lowest to highest. The empty token is the release
/// itself; tokens not in this table rank after `sp` and compare
/// lexicographically among themselves.
const QUALIFIERS: &[&str] = &["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Whole-component aliases, folded before anything else looks at the token.
const ALIASES: &[(&str, &str)] = &[("ga", ""), ("final", ""), ("release", ""), ("cr", "rc")];

fn rank(token: &str) -> usize {
    QUALIFIERS
        .iter()
        .position(|q| *q == token)
        .unwrap_or(QUALIFIERS.len())
}

fn fold_alias(component: &str) -> &str {
    ALIASES
        .iter()
        .find(|(from, _)| *from == component)
        .map_or(component, |(_, to)| *to)
}

/// Single-letter qualifiers written flush against a digit (`1.0a1`) are
/// shorthand for their long forms. Only the tokenizer's digit boundary
/// calls this; `1.0-a-1` keeps its literal `a`.
fn expand_shorthand(component: &str) -> &str {
    match component {
        "a" => "alpha",
        "b" => "beta",
        "m" => "milestone",
        _ => component,
    }
}

/// One tokenized piece of a version. `Int` and `Str` carry dot-separated
/// components; `Group` carries a dash-introduced sub-sequence and only ever
/// appears at the top level of a [`Version`].
#[derive(Clone, Debug)]
pub enum Item {
    Int(usize),
    Str(InternedString),
    Group(Vec<Item>),
}

impl Item {
    /// An item that contributes nothing to an ordering: `0`, the empty
    /// token, or a group of nothing but nulls.
    pub fn is_null(&self) -> bool {
        match self {
            Item::Int(n) => *n == 0,
            Item::Str(s) => s.is_empty(),
            Item::Group(items) => items.iter().all(Item::is_null),
        }
    }
}

fn cmp_tokens(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match rank(a).cmp(&rank(b)) {
        Ordering::Equal => a.cmp(b),
        o => o,
    }
}

// Computed from the Int side; callers on the Str side reverse it.
fn cmp_int_token(n: usize, token: &str) -> Ordering {
    if n > 0 {
        Ordering::Greater
    } else {
        rank("").cmp(&rank(token))
    }
}

// Computed from the Group side; a null group orders exactly as the null
// token would, a live group outranks every token.
fn cmp_group_token(group: &[Item], token: &str) -> Ordering {
    if group.iter().all(Item::is_null) {
        cmp_tokens("", token)
    } else {
        Ordering::Greater
    }
}

// Element-wise, the shorter side padded with `Int(1)` sentinels: `1-1`
// equals `1-1.1`, and `1-1.0` sorts below both.
fn cmp_groups(a: &[Item], b: &[Item]) -> Ordering {
    for pair in a.iter().zip_longest(b.iter()) {
        let ord = match pair {
            EitherOrBoth::Both(l, r) => l.cmp(r),
            EitherOrBoth::Left(l) => l.cmp(&Item::Int(1)),
            EitherOrBoth::Right(r) => Item::Int(1).cmp(r),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Item::Int(a), Item::Int(b)) => a.cmp(b),
            (Item::Str(a), Item::Str(b)) => cmp_tokens(a, b),
            (Item::Int(n), Item::Str(s)) => cmp_int_token(*n, s),
            (Item::Str(s), Item::Int(n)) => cmp_int_token(*n, s).reverse(),
            (Item::Int(_), Item::Group(_)) => Ordering::Greater,
            (Item::Group(_), Item::Int(_)) => Ordering::Less,
            (Item::Group(g), Item::Str(s)) => cmp_group_token(g, s),
            (Item::Str(s), Item::Group(g)) => cmp_group_token(g, s).reverse(),
            (Item::Group(a), Item::Group(b)) => cmp_groups(a, b),
        }
    }
}
impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Item {}

fn component_item(component: &str) -> Item {
    let component = fold_alias(component);
    match component.parse::<usize>() {
        Ok(n) => Item::Int(n),
        Err(_) => Item::Str(component.into()),
    }
}

fn tokenize(raw: &str) -> SmallVec<[Item; 4]> {
    let lower = raw.to_lowercase();
    let mut stack: Vec<Vec<Item>> = Vec::new();
    let mut list: Vec<Item> = Vec::new();
    let mut start = 0;
    let mut in_digits = false;
    for (i, c) in lower.char_indices() {
        match c {
            '.' => {
                if i == start {
                    list.push(Item::Int(0));
                } else {
                    list.push(component_item(&lower[start..i]));
                }
                start = i + 1;
            }
            '-' => {
                if i == start {
                    list.push(Item::Int(0));
                } else {
                    list.push(component_item(&lower[start..i]));
                }
                start = i + 1;
                stack.push(std::mem::take(&mut list));
            }
            _ if c.is_ascii_digit() => {
                if !in_digits && i > start {
                    list.push(Item::Str(expand_shorthand(fold_alias(&lower[start..i])).into()));
                    start = i;
                    stack.push(std::mem::take(&mut list));
                }
                in_digits = true;
            }
            _ => {
                if in_digits && i > start {
                    list.push(component_item(&lower[start..i]));
                    start = i;
                    stack.push(std::mem::take(&mut list));
                }
                in_digits = false;
            }
        }
    }
    if lower.len() > start {
        list.push(component_item(&lower[start..]));
        stack.push(list);
    }

    // The first pushed list is the flattened top level; trailing nulls are
    // trimmed there so `1.0.0` and `1` tokenize identically. Later lists
    // become groups as-is.
    let mut lists = stack.into_iter();
    let mut items: SmallVec<[Item; 4]> = lists.next().unwrap_or_default().into_iter().collect();
    while items.last().map_or(false, Item::is_null) {
        items.pop();
    }
    items.extend(lists.map(Item::Group));
    items
}

/// A Maven-style version: the original string plus its tokenized form.
/// Construction is total — any string, including the empty one, is a
/// version — so the interesting contract is entirely in [`Ord`].
#[derive(Clone, Debug)]
pub struct Version {
    value: InternedString,
    items: SmallVec<[Item; 4]>,
}

impl Version {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The input string this version was tokenized from. Display uses
    /// this verbatim; comparison never does.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    fn has_group(&self) -> bool {
        self.items.iter().any(|item| matches!(item, Item::Group(_)))
    }

    /// Predicate for deciding whether the 'Version' satisfies the 'Predicate'
    pub fn satisfies(&self, predicate: &crate::matcher::Predicate) -> bool {
        predicate.check(self)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // When either side carries groups, missing positions pad with a
        // single-null-token group rather than an empty one: the empty group
        // would compare through its `Int(1)` sentinel and invert the
        // `"" < sp` ordering.
        let pad = if self.has_group() || other.has_group() {
            Item::Group(vec![Item::Str("".into())])
        } else {
            Item::Int(0)
        };
        for pair in self.items.iter().zip_longest(other.items.iter()) {
            let (l, r) = match &pair {
                EitherOrBoth::Both(l, r) => (*l, *r),
                EitherOrBoth::Left(l) => (*l, &pad),
                EitherOrBoth::Right(r) => (&pad, *r),
            };
            if l.is_null() && r.is_null() {
                continue;
            }
            match l.cmp(r) {
                Ordering::Equal => (),
                o => return o,
            }
        }
        Ordering::Equal
    }
}
impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Version {}

impl Default for Version {
    fn default() -> Self {
        Self::from("")
    }
}
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self {
            value: s.into(),
            items: tokenize(s),
        }
    }
}
impl From<String> for Version {
    fn from(s: String) -> Self {
        Self {
            items: tokenize(&s),
            value: s.into(),
        }
    }
}
impl std::str::FromStr for Version {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
