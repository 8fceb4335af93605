use chrono::NaiveDate;

use pairmatch::eligibility::{
    age_compatible, attraction_compatible, is_eligible_pair, Gender, Sexuality,
};
use pairmatch::User;

fn user(id: &str, gender: Option<&str>, sexuality: Option<&str>) -> User {
    let mut user = User::new(id, id);
    user.gender = gender.map(|value| value.to_string());
    user.sexuality = sexuality.map(|value| value.to_string());
    user
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn born(user: &mut User, year: i32) {
    user.birthdate = NaiveDate::from_ymd_opt(year, 6, 1);
}

#[test]
fn straight_man_and_straight_woman_match() {
    let me = user("a", Some("man"), Some("straight"));
    let them = user("b", Some("woman"), Some("straight"));
    assert!(attraction_compatible(&me, &them));
    assert!(attraction_compatible(&them, &me));
}

#[test]
fn straight_same_gender_does_not_match() {
    let me = user("a", Some("man"), Some("straight"));
    let them = user("b", Some("man"), Some("straight"));
    assert!(!attraction_compatible(&me, &them));
}

#[test]
fn gay_and_lesbian_map_to_own_gender() {
    let gay_a = user("a", Some("man"), Some("gay"));
    let gay_b = user("b", Some("man"), Some("gay"));
    assert!(attraction_compatible(&gay_a, &gay_b));

    let lesbian_a = user("c", Some("woman"), Some("lesbian"));
    let lesbian_b = user("d", Some("woman"), Some("lesbian"));
    assert!(attraction_compatible(&lesbian_a, &lesbian_b));

    let straight_woman = user("e", Some("woman"), Some("straight"));
    assert!(!attraction_compatible(&gay_a, &straight_woman));
}

#[test]
fn bisexual_matches_any_gender_that_matches_back() {
    let bi = user("a", Some("non-binary"), Some("bisexual"));
    let pan = user("b", Some("woman"), Some("pansexual"));
    assert!(attraction_compatible(&bi, &pan));

    // Mutuality still applies: a straight woman is not attracted to
    // a non-binary person under the opposite-gender mapping.
    let straight_woman = user("c", Some("woman"), Some("straight"));
    assert!(!attraction_compatible(&bi, &straight_woman));
}

#[test]
fn missing_gender_or_sexuality_fails_open() {
    let blank = user("a", None, None);
    let them = user("b", Some("man"), Some("straight"));
    assert!(attraction_compatible(&blank, &them));
    assert!(attraction_compatible(&them, &blank));

    let no_sexuality = user("c", Some("woman"), None);
    assert!(attraction_compatible(&no_sexuality, &them));
}

#[test]
fn unrecognized_values_fail_open() {
    let odd_gender = user("a", Some("starlight"), Some("straight"));
    let them = user("b", Some("man"), Some("straight"));
    assert!(attraction_compatible(&odd_gender, &them));

    let odd_sexuality = user("c", Some("woman"), Some("sapiosexual"));
    assert!(attraction_compatible(&odd_sexuality, &them));
}

#[test]
fn gender_and_sexuality_parsing() {
    assert_eq!(Gender::parse("Man"), Gender::Man);
    assert_eq!(Gender::parse("NON-BINARY"), Gender::NonBinary);
    assert_eq!(Gender::parse("dragon"), Gender::Unknown);
    assert_eq!(Sexuality::parse("Bi"), Sexuality::Bisexual);
    assert_eq!(Sexuality::parse("everyone"), Sexuality::Everyone);
    assert_eq!(Sexuality::parse("???"), Sexuality::Unknown);
}

#[test]
fn age_never_checked_without_dealbreaker() {
    let me = user("a", Some("man"), Some("straight"));
    let mut them = user("b", Some("woman"), Some("straight"));
    born(&mut them, 1950);
    assert!(age_compatible(&me, &them, today()));
}

#[test]
fn age_dealbreaker_enforces_bounds_inclusively() {
    let mut me = user("a", Some("man"), Some("straight"));
    me.age_range_dealbreaker = true;
    me.age_range_min = Some(30);
    me.age_range_max = Some(40);

    let mut them = user("b", Some("woman"), Some("straight"));
    born(&mut them, 1996); // turns 30 in 2026
    assert!(age_compatible(&me, &them, today()));

    born(&mut them, 1986); // exactly 40
    assert!(age_compatible(&me, &them, today()));

    born(&mut them, 1985); // 41, out of range
    assert!(!age_compatible(&me, &them, today()));
}

#[test]
fn age_dealbreaker_is_asymmetric() {
    let mut me = user("a", Some("man"), Some("straight"));
    me.age_range_dealbreaker = true;
    me.age_range_min = Some(25);
    me.age_range_max = Some(30);
    born(&mut me, 1960);

    let mut them = user("b", Some("woman"), Some("straight"));
    born(&mut them, 1998);

    // My dealbreaker accepts their age, their (absent) dealbreaker never
    // looks at mine.
    assert!(is_eligible_pair(&me, &them, today()));
    assert!(is_eligible_pair(&them, &me, today()));
}

#[test]
fn missing_birthdate_passes_the_age_gate() {
    let mut me = user("a", Some("man"), Some("straight"));
    me.age_range_dealbreaker = true;
    me.age_range_min = Some(25);
    me.age_range_max = Some(30);

    let them = user("b", Some("woman"), Some("straight"));
    assert!(age_compatible(&me, &them, today()));
}

#[test]
fn default_bounds_are_18_to_99() {
    let mut me = user("a", Some("man"), Some("straight"));
    me.age_range_dealbreaker = true;

    let mut them = user("b", Some("woman"), Some("straight"));
    born(&mut them, 2010); // 16
    assert!(!age_compatible(&me, &them, today()));

    born(&mut them, 2007); // 19
    assert!(age_compatible(&me, &them, today()));
}
