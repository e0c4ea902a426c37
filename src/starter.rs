use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

static STARTER_DIR: Dir = include_dir!("src/starter");

/// One word pair in a bundled starter pack.
#[derive(Deserialize, Clone, Debug)]
pub struct StarterPair {
    pub original: String,
    pub translation: String,
}

/// A bundled starter pack, embedded at build time.
#[derive(Deserialize, Clone, Debug)]
pub struct StarterList {
    pub name: String,
    pub pairs: Vec<StarterPair>,
}

impl StarterList {
    /// Names of the bundled starter packs.
    pub fn names() -> Vec<String> {
        let mut names: Vec<String> = STARTER_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Load a starter pack by name, or `None` if no such pack is bundled.
    pub fn load(name: &str) -> Option<StarterList> {
        let file = STARTER_DIR.get_file(format!("{name}.json"))?;
        let text = file
            .contents_utf8()
            .expect("Unable to interpret starter pack as a string");
        Some(from_str(text).expect("Unable to deserialize starter pack json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_packs_are_listed() {
        let names = StarterList::names();
        assert!(names.contains(&"swedish".to_string()));
        assert!(names.contains(&"spanish".to_string()));
    }

    #[test]
    fn test_load_swedish_pack() {
        let pack = StarterList::load("swedish").unwrap();
        assert_eq!(pack.name, "swedish");
        assert!(pack.pairs.len() >= 10);
    }

    #[test]
    fn test_unknown_pack_is_none() {
        assert!(StarterList::load("klingon").is_none());
    }

    #[test]
    fn test_swedish_pack_has_a_parallel_translation() {
        // "dog" appears twice so a fresh install already exercises
        // multi-answer groups.
        let pack = StarterList::load("swedish").unwrap();
        let dogs: Vec<_> = pack.pairs.iter().filter(|p| p.original == "dog").collect();
        assert!(dogs.len() >= 2);
    }
}
