//! Output filename derivation.
//!
//! Every equipment page is written to `<slug>.html`, where the slug comes
//! from the manufacturer and model:
//!
//! - `("Apex", "DS-5000")` → `apex-ds-5000`
//! - `("LDS", "V830 / SPA-K")` → `lds-v830-spa-k`
//! - `("Brüel & Kjær", "4809")` → `bruel-kjaer-4809`
//!
//! Slugs are ASCII only. Common accented Latin letters fold to their base
//! letters, everything else that is not an ASCII letter or digit counts as a
//! separator. Lowercased, every run of separators collapses to a single
//! hyphen, and leading/trailing hyphens are dropped. Distinct documents can
//! map to the same slug; the later one then overwrites the earlier one's page
//! (see [`crate::pipeline`]).

const FALLBACK_SLUG: &str = "equipment";

/// Derive the page slug for a manufacturer + model pair.
pub fn slugify(manufacturer: &str, model: &str) -> String {
    let mut slug = String::with_capacity(manufacturer.len() + model.len() + 1);
    let mut pending_hyphen = false;

    for c in manufacturer.chars().chain(std::iter::once(' ')).chain(model.chars()) {
        let mut buf = [0u8; 4];
        let folded = if c.is_ascii_alphanumeric() {
            Some(&*c.to_ascii_lowercase().encode_utf8(&mut buf))
        } else {
            fold_latin(c)
        };
        match folded {
            Some(text) => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push_str(text);
            }
            None => pending_hyphen = true,
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// ASCII spelling of an accented Latin letter.
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c.to_lowercase().next()? {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ě' | 'ę' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Page filename for a slug.
pub fn page_file_name(slug: &str) -> String {
    format!("{slug}.html")
}
