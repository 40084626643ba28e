//! General-language frequency dictionary.
//!
//! Used as the second correction source, after the catalog vocabulary. A
//! misspelled token is corrected to the most frequent known word within one
//! edit, or within two edits when nothing is one edit away.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ahash::{AHashMap, AHashSet};

use crate::error::{ArancelError, Result};

/// Letters tried when generating insertions and replacements.
pub const SPANISH_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzáéíóúüñ";

/// A dictionary that stores words and their frequencies for spelling correction.
#[derive(Debug, Clone, Default)]
pub struct SpellingDictionary {
    /// Words and their frequencies
    words: AHashMap<String, u32>,
}

impl SpellingDictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word to the dictionary with the given frequency.
    pub fn add_word(&mut self, word: &str, frequency: u32) {
        self.words.insert(word.to_lowercase(), frequency);
    }

    /// Increment the frequency of a word by 1.
    pub fn increment_word(&mut self, word: &str) {
        let current = self.frequency(word);
        self.add_word(word, current + 1);
    }

    /// Check if a word exists in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// Get the frequency of a word.
    pub fn frequency(&self, word: &str) -> u32 {
        self.words.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Get the total number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Load dictionary from a frequency file with format "word frequency" per line.
    ///
    /// Lines without a frequency count as one occurrence. Blank lines and
    /// lines starting with `#` are skipped.
    pub fn load_from_frequency_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ArancelError::config(format!(
                "Failed to open dictionary '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut dictionary = SpellingDictionary::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            if !word.chars().all(char::is_alphabetic) {
                continue;
            }
            match parts.next() {
                Some(raw) => {
                    let frequency = raw.parse::<u32>().map_err(|_| {
                        ArancelError::config(format!("invalid frequency '{raw}' for '{word}'"))
                    })?;
                    dictionary.add_word(word, frequency);
                }
                None => dictionary.increment_word(word),
            }
        }

        Ok(dictionary)
    }

    /// Save dictionary to a frequency file, most frequent first.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let mut word_freq: Vec<(&String, &u32)> = self.words.iter().collect();
        word_freq.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (word, frequency) in word_freq {
            writeln!(writer, "{word} {frequency}")?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Most frequent known word within edit distance 1, else 2.
    ///
    /// Returns the word itself when it is known, and `None` when nothing
    /// known is within two edits. Ties go to the alphabetically first word.
    pub fn correction(&self, word: &str) -> Option<String> {
        let word = word.to_lowercase();
        if word.is_empty() {
            return None;
        }
        if self.words.contains_key(&word) {
            return Some(word);
        }

        let first = generate_edits(&word);
        if let Some(best) = self.most_frequent(first.iter()) {
            return Some(best);
        }

        let mut second = AHashSet::new();
        for edit in &first {
            for candidate in generate_edits(edit) {
                if self.words.contains_key(&candidate) {
                    second.insert(candidate);
                }
            }
        }
        self.most_frequent(second.iter())
    }

    fn most_frequent<'a, I>(&self, candidates: I) -> Option<String>
    where
        I: Iterator<Item = &'a String>,
    {
        candidates
            .filter_map(|c| self.words.get(c).map(|freq| (c, *freq)))
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(word, _)| word.clone())
    }
}

/// All strings one edit away from `word`: deletions, adjacent
/// transpositions, replacements and insertions over [`SPANISH_ALPHABET`].
pub fn generate_edits(word: &str) -> AHashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let len = chars.len();
    let mut edits = AHashSet::new();

    // Deletions
    for i in 0..len {
        let mut new_word = chars.clone();
        new_word.remove(i);
        edits.insert(new_word.into_iter().collect());
    }

    // Transpositions
    for i in 0..len.saturating_sub(1) {
        let mut new_word = chars.clone();
        new_word.swap(i, i + 1);
        edits.insert(new_word.into_iter().collect());
    }

    // Replacements
    for i in 0..len {
        for ch in SPANISH_ALPHABET.chars() {
            if ch != chars[i] {
                let mut new_word = chars.clone();
                new_word[i] = ch;
                edits.insert(new_word.into_iter().collect());
            }
        }
    }

    // Insertions
    for i in 0..=len {
        for ch in SPANISH_ALPHABET.chars() {
            let mut new_word = chars.clone();
            new_word.insert(i, ch);
            edits.insert(new_word.into_iter().collect());
        }
    }

    edits.remove(word);
    edits
}

/// Built-in dictionaries.
pub struct BuiltinDictionary;

impl BuiltinDictionary {
    /// Common Spanish words, weighted towards trade and product vocabulary.
    pub fn spanish() -> SpellingDictionary {
        let mut dict = SpellingDictionary::new();

        let common_words = [
            ("de", 1_000_000),
            ("la", 900_000),
            ("que", 850_000),
            ("el", 800_000),
            ("en", 750_000),
            ("los", 600_000),
            ("del", 550_000),
            ("las", 500_000),
            ("por", 450_000),
            ("con", 420_000),
            ("para", 400_000),
            ("una", 380_000),
            ("sus", 200_000),
            ("como", 190_000),
            ("más", 180_000),
            ("pero", 170_000),
            ("sin", 160_000),
            ("sobre", 150_000),
            ("entre", 140_000),
            ("cuando", 130_000),
            ("también", 120_000),
            ("demás", 110_000),
            ("otros", 100_000),
            ("otras", 95_000),
            ("incluso", 90_000),
            ("excepto", 85_000),
            ("partes", 80_000),
            ("productos", 78_000),
            ("producto", 76_000),
            ("animales", 74_000),
            ("animal", 72_000),
            ("vivos", 70_000),
            ("frescos", 68_000),
            ("fresco", 66_000),
            ("refrigerados", 64_000),
            ("congelados", 62_000),
            ("secos", 60_000),
            ("salados", 58_000),
            ("ahumados", 56_000),
            ("carne", 54_000),
            ("carnes", 52_000),
            ("pescado", 50_000),
            ("pescados", 48_000),
            ("leche", 46_000),
            ("queso", 44_000),
            ("huevos", 42_000),
            ("miel", 40_000),
            ("frutas", 38_000),
            ("fruta", 36_000),
            ("hortalizas", 34_000),
            ("legumbres", 32_000),
            ("cereales", 30_000),
            ("trigo", 29_000),
            ("arroz", 28_000),
            ("maíz", 27_000),
            ("harina", 26_000),
            ("azúcar", 25_000),
            ("café", 24_000),
            ("cacao", 23_000),
            ("aceite", 22_000),
            ("aceites", 21_000),
            ("grasas", 20_000),
            ("bebidas", 19_500),
            ("vino", 19_000),
            ("cerveza", 18_500),
            ("tabaco", 18_000),
            ("madera", 17_500),
            ("papel", 17_000),
            ("algodón", 16_500),
            ("lana", 16_000),
            ("tejidos", 15_500),
            ("prendas", 15_000),
            ("calzado", 14_500),
            ("vidrio", 14_000),
            ("hierro", 13_500),
            ("acero", 13_000),
            ("cobre", 12_500),
            ("aluminio", 12_000),
            ("máquinas", 11_500),
            ("aparatos", 11_000),
            ("vehículos", 10_500),
            ("muebles", 10_000),
            ("juguetes", 9_500),
            ("caballo", 9_000),
            ("caballos", 8_800),
            ("bovino", 8_600),
            ("bovinos", 8_400),
            ("vaca", 8_200),
            ("toro", 8_000),
            ("cerdo", 7_800),
            ("porcino", 7_600),
            ("oveja", 7_400),
            ("cabra", 7_200),
            ("pollo", 7_000),
            ("gallina", 6_800),
            ("aves", 6_600),
            ("pavo", 6_400),
            ("pato", 6_200),
            ("conejo", 6_000),
            ("peces", 5_800),
            ("trucha", 5_600),
            ("salmón", 5_400),
            ("atún", 5_200),
            ("camarón", 5_000),
            ("mariscos", 4_800),
            ("crustáceos", 4_600),
            ("moluscos", 4_400),
            ("papa", 4_200),
            ("tomate", 4_000),
            ("cebolla", 3_900),
            ("ajo", 3_800),
            ("manzana", 3_700),
            ("naranja", 3_600),
            ("plátano", 3_500),
            ("uva", 3_400),
            ("quinua", 3_300),
            ("soya", 3_200),
            ("semillas", 3_100),
            ("plantas", 3_000),
            ("flores", 2_900),
            ("raza", 2_800),
            ("pura", 2_700),
            ("reproductores", 2_600),
            ("vivo", 2_500),
            ("entero", 2_400),
            ("enteros", 2_300),
            ("trozos", 2_200),
            ("filetes", 2_100),
            ("despojos", 2_000),
            ("comestibles", 1_900),
            ("preparaciones", 1_800),
            ("conservas", 1_700),
            ("medicamentos", 1_600),
            ("químicos", 1_500),
            ("plástico", 1_400),
            ("caucho", 1_300),
            ("cuero", 1_200),
            ("pieles", 1_100),
            ("importación", 1_000),
            ("exportación", 950),
            ("permiso", 900),
            ("licencia", 850),
            ("certificado", 800),
            ("sanitario", 750),
            ("arancel", 700),
            ("partida", 650),
            ("subpartida", 600),
            ("capítulo", 550),
            ("sección", 500),
        ];

        for (word, freq) in common_words {
            dict.add_word(word, freq);
        }

        dict
    }
}
