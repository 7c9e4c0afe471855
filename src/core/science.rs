//! Hand-written science answers consulted before the encyclopedia.

pub const SOURCE_SUFFIX: &str = "\n\nSource: Science table";

const TABLE: [(&str, &str); 6] = [
    (
        "speed of light",
        "The speed of light in a vacuum is 299,792,458 metres per second.",
    ),
    (
        "boiling point of water",
        "Pure water boils at 100 °C (212 °F) at sea-level atmospheric pressure.",
    ),
    (
        "photosynthesis",
        "Photosynthesis converts light energy, water and carbon dioxide into glucose and oxygen inside chloroplasts.",
    ),
    (
        "gravity",
        "Near Earth's surface, gravity accelerates objects at about 9.81 m/s².",
    ),
    (
        "dna",
        "DNA (deoxyribonucleic acid) is a double-helix molecule that carries genetic instructions.",
    ),
    (
        "atomic number of carbon",
        "Carbon has atomic number 6: six protons in its nucleus.",
    ),
];

/// First table answer whose trigger occurs in `query`, ignoring case.
pub fn lookup(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();
    TABLE
        .iter()
        .find(|(trigger, _)| query.contains(trigger))
        .map(|(_, answer)| *answer)
}
