// Static lookup tables for offline VIN decoding.

pub struct Manufacturer {
    pub wmi: &'static str,
    pub make: &'static str,
    pub country: &'static str,
}

const fn m(wmi: &'static str, make: &'static str, country: &'static str) -> Manufacturer {
    Manufacturer { wmi, make, country }
}

/// Order matters: the two-character fallback takes the first match.
pub static MANUFACTURERS: &[Manufacturer] = &[
    // Japan
    m("JTD", "Toyota", "Japan"),
    m("JTE", "Toyota", "Japan"),
    m("JTM", "Toyota", "Japan"),
    m("JTH", "Lexus", "Japan"),
    m("JTJ", "Lexus", "Japan"),
    m("JHM", "Honda", "Japan"),
    m("JHL", "Honda", "Japan"),
    m("JN1", "Nissan", "Japan"),
    m("JN8", "Nissan", "Japan"),
    m("JNK", "Infiniti", "Japan"),
    m("JM1", "Mazda", "Japan"),
    m("JF1", "Subaru", "Japan"),
    m("JS2", "Suzuki", "Japan"),
    m("JA4", "Mitsubishi", "Japan"),
    // Korea
    m("KMH", "Hyundai", "Korea"),
    m("KMF", "Hyundai", "Korea"),
    m("KNA", "Kia", "Korea"),
    m("KND", "Kia", "Korea"),
    m("KMT", "Genesis", "Korea"),
    // China
    m("LVS", "Chery", "China"),
    m("L6T", "Geely", "China"),
    m("LFV", "BYD", "China"),
    m("LGW", "Haval", "China"),
    m("LSJ", "MG", "China"),
    m("LS5", "Changan", "China"),
    // North America
    m("1FA", "Ford", "USA"),
    m("1FT", "Ford", "USA"),
    m("1G1", "Chevrolet", "USA"),
    m("1GC", "Chevrolet", "USA"),
    m("1GT", "GMC", "USA"),
    m("1C4", "Chrysler", "USA"),
    m("5N1", "Nissan", "USA"),
    m("5NP", "Hyundai", "USA"),
    m("5YJ", "Tesla", "USA"),
    // Europe
    m("WAU", "Audi", "Germany"),
    m("WBA", "BMW", "Germany"),
    m("WDD", "Mercedes-Benz", "Germany"),
    m("WVW", "Volkswagen", "Germany"),
    m("WP0", "Porsche", "Germany"),
    m("SAL", "Land Rover", "UK"),
    m("SAJ", "Jaguar", "UK"),
    m("VF1", "Renault", "France"),
    m("YS3", "Volvo", "Sweden"),
    // Regional assembly
    m("MNT", "Nissan", "UAE"),
    m("MHF", "Toyota", "Thailand"),
    m("6T1", "Toyota", "Australia"),
];

/// Model year codes (position 10), 2010-2039.
static YEAR_CODES: &[(char, u16)] = &[
    ('A', 2010), ('B', 2011), ('C', 2012), ('D', 2013), ('E', 2014),
    ('F', 2015), ('G', 2016), ('H', 2017), ('J', 2018), ('K', 2019),
    ('L', 2020), ('M', 2021), ('N', 2022), ('P', 2023), ('R', 2024),
    ('S', 2025), ('T', 2026), ('V', 2027), ('W', 2028), ('X', 2029),
    ('Y', 2030), ('1', 2031), ('2', 2032), ('3', 2033), ('4', 2034),
    ('5', 2035), ('6', 2036), ('7', 2037), ('8', 2038), ('9', 2039),
];

/// Model by VIN position 5, for the makes that are common in the fleet.
static MODELS_BY_POSITION_5: &[(&str, &[(char, &str)])] = &[
    (
        "Toyota",
        &[
            ('U', "Camry"),
            ('P', "RAV4"),
            ('3', "Corolla"),
            ('F', "Land Cruiser"),
            ('N', "Hilux"),
            ('C', "Prado"),
            ('W', "Fortuner"),
            ('S', "Yaris"),
            ('R', "Highlander"),
        ],
    ),
    (
        "Nissan",
        &[
            ('3', "Altima"),
            ('6', "Patrol"),
            ('1', "Sentra"),
            ('5', "Pathfinder"),
            ('T', "X-Trail"),
            ('7', "Sunny"),
            ('A', "Maxima"),
            ('J', "Qashqai"),
            ('P', "Kicks"),
        ],
    ),
    (
        "Honda",
        &[
            ('V', "Accord"),
            ('C', "Civic"),
            ('W', "CR-V"),
            ('F', "Pilot"),
            ('U', "HR-V"),
            ('L', "Odyssey"),
            ('M', "City"),
        ],
    ),
    (
        "Hyundai",
        &[
            ('D', "Elantra"),
            ('N', "Sonata"),
            ('M', "Tucson"),
            ('S', "Santa Fe"),
            ('X', "Palisade"),
            ('C', "Accent"),
            ('K', "Kona"),
        ],
    ),
];

pub fn manufacturer_exact(wmi: &str) -> Option<&'static Manufacturer> {
    MANUFACTURERS.iter().find(|entry| entry.wmi == wmi)
}

/// First table entry whose code starts with `prefix`.
pub fn manufacturer_by_prefix(prefix: &str) -> Option<&'static Manufacturer> {
    MANUFACTURERS.iter().find(|entry| entry.wmi.starts_with(prefix))
}

pub fn model_year(code: char) -> Option<u16> {
    YEAR_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, year)| *year)
}

pub fn model_name(make: &str, position_5: char) -> Option<&'static str> {
    MODELS_BY_POSITION_5
        .iter()
        .find(|(m, _)| *m == make)
        .and_then(|(_, models)| models.iter().find(|(c, _)| *c == position_5))
        .map(|(_, model)| *model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wmi_codes_unique() {
        let codes: HashSet<_> = MANUFACTURERS.iter().map(|m| m.wmi).collect();
        assert_eq!(codes.len(), MANUFACTURERS.len());
        assert!(MANUFACTURERS.iter().all(|m| m.wmi.len() == 3));
    }

    #[test]
    fn test_year_codes_cover_2010_to_2039() {
        assert_eq!(YEAR_CODES.len(), 30);
        assert_eq!(model_year('A'), Some(2010));
        assert_eq!(model_year('Y'), Some(2030));
        assert_eq!(model_year('9'), Some(2039));
        assert_eq!(model_year('U'), None);
        assert_eq!(model_year('0'), None);
    }

    #[test]
    fn test_prefix_lookup_takes_first_entry() {
        assert_eq!(manufacturer_by_prefix("JT").map(|m| m.make), Some("Toyota"));
        assert_eq!(manufacturer_by_prefix("1G").map(|m| m.wmi), Some("1G1"));
        assert!(manufacturer_by_prefix("1M").is_none());
    }

    #[test]
    fn test_model_lookup() {
        assert_eq!(model_name("Honda", 'C'), Some("Civic"));
        assert_eq!(model_name("Honda", 'Z'), None);
        assert_eq!(model_name("BMW", 'C'), None);
    }
}
