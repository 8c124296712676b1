/// This module implements the total ordering that Maven-style dependency resolvers apply to version
/// strings. Unlike semver, any string at all is a version: components are split on `.` and `-` (and on
/// implicit digit/letter boundaries), numeric components compare numerically, and the well-known
/// qualifiers order as `alpha < beta < milestone < rc < snapshot < "" < sp`, with `ga`/`final`/`release`
/// folding to the bare release and `cr` folding to `rc`. Dash-introduced chains nest as groups so that
/// `1.foo < 1-foo < 1-1 < 1.1` comes out the way resolvers expect, and trailing null components are
/// trimmed so that `1.0.0` and `1` are the same version.
pub mod version;
pub use crate::version::*;

/// This module implements the two expression languages that declare which versions are acceptable:
/// comparator constraints (`>=1.0, <2.0 || >3.0`) and Maven bracket requirements (`[1.0,2.0)`,
/// `[1.0.0]`, or a bare advisory version), plus the facade that tries one grammar and falls back to
/// the other. Build manifests embed these strings, so the grammars are the compatibility contract.
pub mod matcher;
pub use crate::matcher::*;

#[cfg(test)]
mod test;
