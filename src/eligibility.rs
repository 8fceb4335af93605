use chrono::NaiveDate;

use crate::user::User;

const DEFAULT_AGE_MIN: u32 = 18;
const DEFAULT_AGE_MAX: u32 = 99;

/// Canonical genders used for attraction matching. Declared gender strings
/// are free-form input; anything unrecognized parses to `Unknown` and keeps
/// the pair eligible (missing or odd data must not silently exclude anyone).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Man,
    Woman,
    NonBinary,
    Unknown,
}

impl Gender {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "man" | "male" | "m" => Gender::Man,
            "woman" | "female" | "f" => Gender::Woman,
            "non-binary" | "nonbinary" | "non_binary" | "nb" | "enby" => Gender::NonBinary,
            _ => Gender::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sexuality {
    Straight,
    Gay,
    Lesbian,
    Bisexual,
    Pansexual,
    Queer,
    Everyone,
    Unknown,
}

impl Sexuality {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "straight" | "heterosexual" | "hetero" => Sexuality::Straight,
            "gay" | "homosexual" => Sexuality::Gay,
            "lesbian" => Sexuality::Lesbian,
            "bisexual" | "bi" => Sexuality::Bisexual,
            "pansexual" | "pan" => Sexuality::Pansexual,
            "queer" => Sexuality::Queer,
            "everyone" | "all" | "open" => Sexuality::Everyone,
            _ => Sexuality::Unknown,
        }
    }
}

const ALL_GENDERS: &[Gender] = &[Gender::Man, Gender::Woman, Gender::NonBinary];
const MEN: &[Gender] = &[Gender::Man];
const WOMEN: &[Gender] = &[Gender::Woman];
const NON_BINARY: &[Gender] = &[Gender::NonBinary];

/// The set of genders a person is attracted to, given their own declared
/// gender. Unrecognized sexualities default to all three canonical genders.
pub fn attracted_genders(own: Gender, sexuality: Sexuality) -> &'static [Gender] {
    match sexuality {
        Sexuality::Straight => match own {
            Gender::Man => WOMEN,
            Gender::Woman => MEN,
            Gender::NonBinary | Gender::Unknown => ALL_GENDERS,
        },
        Sexuality::Gay | Sexuality::Lesbian => match own {
            Gender::Man => MEN,
            Gender::Woman => WOMEN,
            Gender::NonBinary => NON_BINARY,
            Gender::Unknown => ALL_GENDERS,
        },
        Sexuality::Bisexual
        | Sexuality::Pansexual
        | Sexuality::Queer
        | Sexuality::Everyone
        | Sexuality::Unknown => ALL_GENDERS,
    }
}

/// Mutual attraction check. Fails open: whenever either side's gender or
/// sexuality is unset or unrecognized, the pair is treated as compatible.
pub fn attraction_compatible(me: &User, them: &User) -> bool {
    let (Some(my_gender), Some(my_sexuality)) = (me.gender.as_deref(), me.sexuality.as_deref())
    else {
        return true;
    };
    let (Some(their_gender), Some(their_sexuality)) =
        (them.gender.as_deref(), them.sexuality.as_deref())
    else {
        return true;
    };

    let my_gender = Gender::parse(my_gender);
    let their_gender = Gender::parse(their_gender);
    if my_gender == Gender::Unknown || their_gender == Gender::Unknown {
        return true;
    }

    let my_set = attracted_genders(my_gender, Sexuality::parse(my_sexuality));
    let their_set = attracted_genders(their_gender, Sexuality::parse(their_sexuality));
    my_set.contains(&their_gender) && their_set.contains(&my_gender)
}

/// One-sided age gate: enforced only when the viewer declared their age range
/// a dealbreaker. A missing birthdate on the other side passes.
pub fn age_compatible(me: &User, them: &User, today: NaiveDate) -> bool {
    if !me.age_range_dealbreaker {
        return true;
    }
    let Some(age) = them.age_on(today) else {
        return true;
    };
    let min = me.age_range_min.map(u32::from).unwrap_or(DEFAULT_AGE_MIN);
    let max = me.age_range_max.map(u32::from).unwrap_or(DEFAULT_AGE_MAX);
    age >= min && age <= max
}

pub fn is_eligible_pair(me: &User, them: &User, today: NaiveDate) -> bool {
    attraction_compatible(me, them) && age_compatible(me, them, today)
}
