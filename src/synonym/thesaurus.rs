//! Domain thesaurus: canonical term to related terms.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use lazy_static::lazy_static;

use crate::error::{ArancelError, Result};

/// Built-in Spanish agricultural and food thesaurus.
const SPANISH_ENTRIES: &[(&str, &[&str])] = &[
    (
        "vaca",
        &[
            "bovino",
            "res",
            "ganado vacuno",
            "ganado bovino",
            "toro",
            "novillo",
            "becerro",
            "carne de res",
        ],
    ),
    ("bovino", &["vaca", "res", "ganado bovino", "ganado vacuno", "toro", "novillo", "becerro"]),
    (
        "res",
        &[
            "vaca",
            "bovino",
            "ganado vacuno",
            "ganado bovino",
            "toro",
            "novillo",
            "becerro",
            "carne de res",
        ],
    ),
    ("ganado vacuno", &["vaca", "bovino", "res", "ganado bovino", "toro", "novillo", "becerro"]),
    ("ganado bovino", &["vaca", "bovino", "res", "ganado vacuno", "toro", "novillo", "becerro"]),
    ("caballo", &["equino", "caballos", "potro", "yegua", "caballo criollo", "équido"]),
    ("equino", &["caballo", "caballos", "potro", "yegua", "équido"]),
    ("potro", &["caballo", "equino", "caballos", "yegua"]),
    ("yegua", &["caballo", "equino", "potro"]),
    ("équido", &["caballo", "equino", "potro", "yegua"]),
    ("toro", &["vaca", "bovino", "res", "ganado vacuno", "animal reproductor"]),
    ("novillo", &["vaca", "bovino", "res", "ganado vacuno", "becerro"]),
    ("becerro", &["vaca", "bovino", "res", "novillo", "cría de vacuno"]),
    (
        "pez",
        &[
            "peces",
            "pescado",
            "pez fresco",
            "pescadilla",
            "bacalao",
            "trucha",
            "salmón",
            "merluza",
        ],
    ),
    (
        "peces",
        &[
            "pez",
            "pescado",
            "pez fresco",
            "pescadilla",
            "bacalao",
            "trucha",
            "salmón",
            "merluza",
        ],
    ),
    (
        "pescado",
        &[
            "pez",
            "peces",
            "pescado fresco",
            "pescadilla",
            "bacalao",
            "trucha",
            "salmón",
            "merluza",
        ],
    ),
    ("pescadilla", &["pez", "peces", "pescado", "bacalao", "merluza"]),
    ("bacalao", &["pez", "peces", "pescado", "merluza", "sollo"]),
    ("trucha", &["pez", "peces", "pescado", "salmón"]),
    ("salmón", &["pez", "peces", "pescado", "trucha"]),
    ("merluza", &["pez", "peces", "pescado", "bacalao", "pescadilla"]),
    ("sollo", &["pez", "peces", "bacalao", "pescado de agua dulce"]),
    ("marisco", &["mariscos", "crustáceo", "camarón", "langosta", "cangrejo", "ostra"]),
    ("mariscos", &["marisco", "crustáceo", "camarón", "langosta", "cangrejo", "ostra"]),
    ("camarón", &["marisco", "mariscos", "crustáceo", "langostino"]),
    ("langostino", &["marisco", "mariscos", "camarón", "crustáceo"]),
    ("langosta", &["marisco", "mariscos", "crustáceo"]),
    ("cangrejo", &["marisco", "mariscos", "crustáceo"]),
    ("ostra", &["marisco", "mariscos", "molusco"]),
    ("mejillón", &["marisco", "mariscos", "molusco"]),
    ("molusco", &["marisco", "mariscos", "ostra", "mejillón"]),
    (
        "huevo",
        &[
            "huevos",
            "ovoproduto",
            "clara",
            "yema",
            "cascara",
            "huevo de gallina",
            "huevo de codorniz",
        ],
    ),
    ("huevos", &["huevo", "ovoproduto", "clara", "yema", "huevo de gallina", "huevo de codorniz"]),
    ("gallina", &["pollo", "ave", "aves", "gallo", "corral"]),
    ("pollo", &["gallina", "ave", "aves", "carne de pollo", "pechuga", "muslo", "ala"]),
    ("ave", &["gallina", "pollo", "aves", "pavo", "pato", "codorniz"]),
    ("aves", &["ave", "gallina", "pollo", "pavo", "pato", "codorniz"]),
    ("pavo", &["ave", "aves", "pollo", "gallina"]),
    ("pato", &["ave", "aves", "pollo", "gallina"]),
    ("codorniz", &["ave", "aves", "huevo"]),
    ("cerdo", &["porcino", "cerdos", "puerco", "cochino", "lechón", "jamón", "tocino"]),
    ("porcino", &["cerdo", "cerdos", "puerco", "cochino", "lechón"]),
    ("puerco", &["cerdo", "porcino", "cochino", "lechón"]),
    ("cochino", &["cerdo", "porcino", "puerco", "lechón"]),
    ("lechón", &["cerdo", "porcino", "cría de cerdo"]),
    ("jamón", &["embutido", "producto cárnico", "cerdo"]),
    ("tocino", &["cerdo", "porcino", "grasa de cerdo"]),
    ("oveja", &["ovino", "ovejas", "borrego", "carnero", "lana", "carne de oveja"]),
    ("ovino", &["oveja", "ovejas", "borrego", "carnero"]),
    ("borrego", &["oveja", "ovino", "ovejas", "carnero"]),
    ("carnero", &["oveja", "ovino", "borrego", "animal reproductor"]),
    ("cabra", &["caprino", "cabras", "chivo", "cabrilla", "leche de cabra"]),
    ("caprino", &["cabra", "cabras", "chivo"]),
    ("chivo", &["cabra", "caprino", "macho cabrío"]),
    ("leche", &["lácteo", "lacteos", "producto lácteo", "leche en polvo", "leche condensada"]),
    ("lacteo", &["leche", "lacteos", "producto lácteo"]),
    ("lacteos", &["leche", "lacteo", "producto lácteo"]),
    ("queso", &["lácteo", "quesería", "queso fresco", "queso curado"]),
    ("mantequilla", &["lácteo", "manteca", "producto lácteo"]),
    ("yogur", &["lácteo", "fermentado", "producto lácteo"]),
    ("crema", &["lácteo", "nata", "producto lácteo"]),
    ("trigo", &["cereal", "grano", "harina de trigo", "trigo candeal", "trigo blando"]),
    ("maíz", &["cereal", "grano", "choclo", "maíz blanco", "maíz amarillo", "harina de maíz"]),
    ("arroz", &["cereal", "grano", "arroz blanco", "arroz integral", "arrocero"]),
    ("cebada", &["cereal", "grano"]),
    ("avena", &["cereal", "grano"]),
    ("centeno", &["cereal", "grano"]),
    ("sorgo", &["cereal", "grano"]),
    ("cereal", &["trigo", "maíz", "arroz", "cebada", "avena", "centeno", "sorgo", "grano"]),
    ("grano", &["cereal", "trigo", "maíz", "arroz", "cebada", "avena"]),
    ("manzana", &["fruta", "pomácea", "manzana roja", "manzana verde"]),
    ("pera", &["fruta", "pomácea"]),
    ("uva", &["fruta", "vinífera", "uva de mesa", "uva para vino"]),
    ("naranja", &["fruta", "cítrico", "citrus"]),
    ("limón", &["fruta", "cítrico", "citrus", "lima"]),
    ("plátano", &["fruta", "banana", "banano"]),
    ("banana", &["fruta", "plátano", "banano"]),
    ("papaya", &["fruta", "tropical"]),
    ("mango", &["fruta", "tropical", "mango de exportación"]),
    ("papa", &["tubérculo", "patata", "papa criolla", "papa nativa"]),
    ("patata", &["papa", "tubérculo"]),
    ("tubérculo", &["papa", "patata", "yuca", "camote"]),
    ("yuca", &["tubérculo", "mandioca"]),
    ("camote", &["tubérculo", "batata"]),
    ("tomate", &["hortalizas", "solanácea", "tomate fresco", "tomate maduro"]),
    ("lechuga", &["hortalizas", "verdura", "lechuga fresca"]),
    ("verdura", &["hortalizas", "lechuga", "repollo", "zanahoria"]),
    ("hortalizas", &["verdura", "tomate", "lechuga", "repollo"]),
    ("zanahoria", &["hortalizas", "tubérculo", "verdura"]),
    ("repollo", &["hortalizas", "verdura", "col"]),
    ("col", &["hortalizas", "repollo", "verdura"]),
    ("miel", &["producto apícola", "apícola", "miel de abeja"]),
    ("apícola", &["miel", "producto apícola", "abeja"]),
    ("abeja", &["apícola", "miel", "producto apícola"]),
    ("café", &["cafeto", "grano de café", "café molido", "café instantáneo", "cafetería"]),
    ("cacao", &["chocolate", "cacao en grano", "pasta de cacao", "cocoa"]),
    ("chocolate", &["cacao", "producto de cacao", "chocolatería"]),
    ("carne", &["carnes", "producto cárnico", "carne roja", "carne blanca", "carne fresca"]),
    ("carnes", &["carne", "producto cárnico"]),
    ("embutido", &["producto cárnico", "chorizo", "salchicha", "mortadela", "jamón"]),
    ("chorizo", &["embutido", "producto cárnico"]),
    ("salchicha", &["embutido", "producto cárnico"]),
    ("pimienta", &["especia", "condimento", "pimienta negra", "pimienta blanca"]),
    ("sal", &["condimento", "cloruro de sodio"]),
    ("ajo", &["condimento", "hortaliza"]),
    ("cebolla", &["condimento", "hortaliza"]),
    ("canela", &["especia", "condimento"]),
    (
        "aceite",
        &[
            "grasa",
            "aceite vegetal",
            "aceite de oliva",
            "aceite de palma",
            "aceite de soja",
        ],
    ),
    ("grasa", &["aceite", "grasa animal", "manteca"]),
    ("manteca", &["grasa", "producto lácteo", "mantequilla"]),
    ("vino", &["bebida alcohólica", "vino tinto", "vino blanco", "vino rosado"]),
    ("cerveza", &["bebida alcohólica", "cervecería"]),
    ("bebida", &["bebida alcohólica", "bebida sin alcohol", "líquido"]),
    ("jugo", &["bebida", "zumo", "jugo de fruta"]),
    ("zumo", &["jugo", "bebida", "zumo de fruta"]),
    ("flor", &["flores", "planta ornamental", "flor cortada", "botánica"]),
    ("flores", &["flor", "planta ornamental"]),
    ("rosa", &["flor", "flores", "planta ornamental"]),
    ("clavel", &["flor", "flores", "planta ornamental"]),
    ("lana", &["fibra", "tejido", "oveja", "producto textil"]),
    ("algodón", &["fibra", "tejido", "producto textil"]),
    ("seda", &["fibra", "tejido", "producto textil"]),
    ("fibra", &["lana", "algodón", "seda", "producto textil"]),
    ("madera", &["forestal", "madera aserrada", "tabla", "tablón", "leña"]),
    ("forestal", &["madera", "producto forestal"]),
    ("tabla", &["madera", "madera aserrada"]),
    ("leña", &["madera", "combustible"]),
];

lazy_static! {
    static ref SPANISH: Arc<Thesaurus> =
        Arc::new(Thesaurus::from_entries(SPANISH_ENTRIES.iter().map(|(term, related)| {
            (term.to_string(), related.iter().map(|r| r.to_string()).collect())
        })));
}

/// Term to related-terms table.
///
/// Terms and related terms are stored lowercased and trimmed. Entries keep
/// their insertion order so expansions are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thesaurus {
    entries: Vec<(String, Vec<String>)>,
    index: AHashMap<String, usize>,
}

impl Thesaurus {
    /// Build a thesaurus from `(term, related)` pairs.
    ///
    /// A repeated term replaces the earlier related list in place. Empty
    /// terms, self references and duplicate related terms are dropped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut thesaurus = Thesaurus::default();
        for (term, related) in entries {
            let term = normalize_term(&term);
            if term.is_empty() {
                continue;
            }

            let mut values: Vec<String> = Vec::with_capacity(related.len());
            for value in related {
                let value = normalize_term(&value);
                if !value.is_empty() && value != term && !values.contains(&value) {
                    values.push(value);
                }
            }

            match thesaurus.index.get(&term) {
                Some(&pos) => thesaurus.entries[pos].1 = values,
                None => {
                    thesaurus.index.insert(term.clone(), thesaurus.entries.len());
                    thesaurus.entries.push((term, values));
                }
            }
        }
        thesaurus
    }

    /// The built-in Spanish table, shared.
    pub fn spanish() -> Arc<Thesaurus> {
        Arc::clone(&SPANISH)
    }

    /// Load a JSON object mapping each term to an array of related terms.
    ///
    /// ```json
    /// {"quinua": ["quinoa", "cereal andino"], "papa": ["patata"]}
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ArancelError::config(format!(
                "Failed to read synonym file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let table: BTreeMap<String, Vec<String>> = serde_json::from_str(&content).map_err(|e| {
            ArancelError::config(format!(
                "Failed to parse synonym file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::from_entries(table))
    }

    /// Related terms of `term`, if it is a key.
    pub fn get(&self, term: &str) -> Option<&[String]> {
        self.index
            .get(term)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(term, related)| (term.as_str(), related.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercase and trim a term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_table() {
        let thesaurus = Thesaurus::spanish();
        assert!(!thesaurus.is_empty());

        let caballo = thesaurus.get("caballo").unwrap();
        assert!(caballo.contains(&"equino".to_string()));
        assert!(caballo.contains(&"équido".to_string()));

        // Duplicates in the source lists are collapsed
        let equido = thesaurus.get("équido").unwrap();
        assert_eq!(equido.iter().filter(|t| *t == "caballo").count(), 1);

        assert!(thesaurus.get("computadora").is_none());
    }

    #[test]
    fn test_from_entries_normalizes() {
        let thesaurus = Thesaurus::from_entries(vec![
            (
                " Quinua ".to_string(),
                vec!["Quinoa".to_string(), "quinua".to_string(), "quinoa".to_string()],
            ),
            ("".to_string(), vec!["x".to_string()]),
            ("papa".to_string(), vec!["patata".to_string()]),
            ("papa".to_string(), vec!["tubérculo".to_string()]),
        ]);

        assert_eq!(thesaurus.len(), 2);
        assert_eq!(thesaurus.get("quinua").unwrap(), ["quinoa".to_string()]);
        assert_eq!(thesaurus.get("papa").unwrap(), ["tubérculo".to_string()]);
        let keys: Vec<&str> = thesaurus.iter().map(|(term, _)| term).collect();
        assert_eq!(keys, vec!["quinua", "papa"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"Llama": ["camélido", "alpaca"], "alpaca": ["llama"]}}"#).unwrap();
        file.flush().unwrap();

        let thesaurus = Thesaurus::load_from_file(file.path()).unwrap();
        assert_eq!(thesaurus.len(), 2);
        assert_eq!(
            thesaurus.get("llama").unwrap(),
            ["camélido".to_string(), "alpaca".to_string()]
        );
    }

    #[test]
    fn test_load_from_file_rejects_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[["llama", "alpaca"]]"#).unwrap();
        file.flush().unwrap();

        let err = Thesaurus::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ArancelError::Config(_)));
    }
}
