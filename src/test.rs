use std::cmp::Ordering;

use itertools::Itertools;
use proptest::prelude::*;

use crate::matcher::*;
use crate::version::*;

prop_compose! {
    // any string at all is a version; this exercises the tokenizer's
    // separators, implicit boundaries, and alias folding
    fn raw_version()(s in "[0-9a-zA-Z.-]{0,16}") -> Version {
        Version::from(s.as_str())
    }
}

prop_compose! {
    fn release_train()(segments in prop::collection::vec(0usize..20, 1..5)) -> String {
        segments.iter().join(".")
    }
}

fn qualifier() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("alpha"),
        Just("beta"),
        Just("milestone"),
        Just("rc"),
        Just("snapshot"),
        Just("ga"),
        Just("final"),
        Just("sp"),
        Just("hotfix"),
        Just("nightly"),
    ]
}

prop_compose! {
    // versions shaped the way artifacts actually publish them:
    // a numeric train followed by dashed qualifier chains
    fn maven_version()(
        core in release_train(),
        chain in prop::collection::vec((qualifier(), 0usize..20), 0..3),
    ) -> Version {
        let mut s = core;
        for (qualifier, n) in chain {
            s.push('-');
            s.push_str(qualifier);
            s.push('-');
            s.push_str(&n.to_string());
        }
        Version::from(s.as_str())
    }
}

prop_compose! {
    fn anchor_gen()(
        op in prop_oneof![Just(LT), Just(LTE), Just(EQ), Just(NEQ), Just(GT), Just(GTE)],
        v in maven_version(),
    ) -> Predicate {
        Predicate::anchor(op, v)
    }
}

prop_compose! {
    fn and_gen(inner: impl Strategy<Value = Predicate> + Clone)(a in inner.clone(), b in inner) -> Predicate {
        Predicate::and(a, b)
    }
}

prop_compose! {
    fn or_gen(inner: impl Strategy<Value = Predicate> + Clone)(a in inner.clone(), b in inner) -> Predicate {
        Predicate::or(a, b)
    }
}

fn predicate_gen() -> BoxedStrategy<Predicate> {
    let leaf = prop_oneof![
        Just(Predicate::Any),
        Just(Predicate::None),
        anchor_gen()
    ];
    leaf.prop_recursive(2, 8, 4, |inner| {
        prop_oneof![and_gen(inner.clone()), or_gen(inner)]
    })
    .boxed()
}

proptest! {
    #[test]
    fn compare_is_antisymmetric(a in raw_version(), b in raw_version()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn compare_agrees_with_eq(a in raw_version(), b in raw_version()) {
        prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
        prop_assert_eq!(a < b, a.cmp(&b) == Ordering::Less);
        prop_assert_eq!(a > b, a.cmp(&b) == Ordering::Greater);
    }

    #[test]
    fn compare_is_reflexive(a in raw_version()) {
        prop_assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn compare_is_transitive(a in maven_version(), b in maven_version(), c in maven_version()) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
        if a >= b && b >= c {
            prop_assert!(a >= c);
        }
    }

    #[test]
    fn null_suffixes_do_not_change_ordering(core in release_train()) {
        let v = Version::from(core.as_str());
        for suffix in [".0", ".0.0", "-", "-ga", ".RELEASE"] {
            let padded = Version::from(format!("{core}{suffix}").as_str());
            prop_assert_eq!(v.cmp(&padded), Ordering::Equal, "suffix {}", suffix);
        }
    }

    #[test]
    fn inclusive_bounds_accept_their_anchor(v in maven_version()) {
        let gte: Matcher = format!(">={v}").parse().unwrap();
        prop_assert!(gte.check(&v));
        let from: Matcher = format!("[{v},]").parse().unwrap();
        prop_assert!(from.check(&v));
        let pin: Matcher = format!("[{v}]").parse().unwrap();
        prop_assert!(pin.check(&v));
    }

    #[test]
    fn exclusive_bounds_reject_their_anchor(v in maven_version()) {
        let gt: Matcher = format!(">{v}").parse().unwrap();
        prop_assert!(!gt.check(&v));
        let below: Matcher = format!("(,{v})").parse().unwrap();
        prop_assert!(!below.check(&v));
    }

    #[test]
    fn and_commut(a in predicate_gen(), b in predicate_gen(), obs in maven_version()) {
        prop_assert_eq!(obs.satisfies(&Predicate::and(a.clone(), b.clone())), obs.satisfies(&Predicate::and(b, a)));
    }

    #[test]
    fn or_commut(a in predicate_gen(), b in predicate_gen(), obs in maven_version()) {
        prop_assert_eq!(obs.satisfies(&Predicate::or(a.clone(), b.clone())), obs.satisfies(&Predicate::or(b, a)));
    }

    #[test]
    fn and_both(a in predicate_gen(), b in predicate_gen(), obs in maven_version()) {
        prop_assert_eq!(obs.satisfies(&a) && obs.satisfies(&b), obs.satisfies(&Predicate::and(a, b)));
    }

    #[test]
    fn or_either(a in predicate_gen(), b in predicate_gen(), obs in maven_version()) {
        prop_assert_eq!(obs.satisfies(&a) || obs.satisfies(&b), obs.satisfies(&Predicate::or(a, b)));
    }

    #[test]
    fn any_ident_and(a in predicate_gen(), obs in maven_version()) {
        prop_assert_eq!(obs.satisfies(&a), obs.satisfies(&Predicate::and(Predicate::Any, a)));
    }

    #[test]
    fn none_ident_or(a in predicate_gen(), obs in maven_version()) {
        prop_assert_eq!(obs.satisfies(&a), obs.satisfies(&Predicate::or(Predicate::None, a)));
    }

    #[test]
    fn any_accepts_any(obs in raw_version()) {
        prop_assert!(obs.satisfies(&Predicate::Any));
    }

    #[test]
    fn none_accepts_none(obs in raw_version()) {
        prop_assert!(!obs.satisfies(&Predicate::None));
    }

    #[test]
    fn matcher_reparse_preserves_behavior(expr_v in maven_version(), obs in maven_version()) {
        let matcher: Matcher = format!("[{expr_v},)").parse().unwrap();
        let reparsed: Matcher = matcher.to_string().parse().unwrap();
        prop_assert_eq!(matcher.check(&obs), reparsed.check(&obs));
    }
}

#[cfg(feature = "serde")]
#[test]
fn deser() {
    let v: Version = serde_yaml::from_str("---\n1.5.0\n").unwrap();
    let m: Matcher = serde_yaml::from_str("---\n\"[1.0,2.0)\"\n").unwrap();
    assert!(m.check(&v));
    let c: Constraint = serde_yaml::from_str("---\n\">=1.0, <2.0 || >3.0\"\n").unwrap();
    assert!(c.check(&v));
}
