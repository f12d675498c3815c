use itertools::Itertools;

/// Word substitutions applied before matching, so regional names hit the
/// same recipes as the dataset spelling.
const SYNONYMS: [(&str, &str); 6] = [
    ("aubergine", "eggplant"),
    ("brinjal", "eggplant"),
    ("baingan", "eggplant"),
    ("paneer", "cottage cheese"),
    ("chole", "chickpeas"),
    ("rajma", "kidney beans"),
];

const DIET_KEYWORDS: [&str; 5] = [
    "vegetarian",
    "vegan",
    "gluten-free",
    "non-veg",
    "non vegetarian",
];

const COURSE_KEYWORDS: [&str; 7] = [
    "breakfast",
    "lunch",
    "dinner",
    "snack",
    "dessert",
    "main course",
    "side dish",
];

/// Words that carry no dish information in a chat query.
const FILLER_WORDS: [&str; 16] = [
    "a", "an", "the", "some", "any", "please", "recipe", "for", "of", "me", "i", "want", "how",
    "to", "make", "cook",
];

const MAX_OPTIONS: usize = 5;

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ExtractedQuery {
    pub dish: Option<String>,
    pub diet: Option<String>,
    pub course: Option<String>,
}

/// Pulls dish name, diet filter and course filter out of a free-form chat
/// query, e.g. "vegetarian rajma recipe for dinner".
pub fn extract_entities(user_input: &str) -> ExtractedQuery {
    let mut input = user_input.to_lowercase();
    for (word, replacement) in SYNONYMS {
        input = replace_word(&input, word, replacement);
    }

    // Longest keyword first so "non vegetarian" wins over "vegetarian"
    let diet = DIET_KEYWORDS
        .iter()
        .sorted_by_key(|k| -(k.len() as i64))
        .find(|keyword| input.contains(*keyword))
        .map(|keyword| keyword.to_string());
    if let Some(diet) = &diet {
        input = input.replace(diet.as_str(), " ");
    }

    let course = COURSE_KEYWORDS
        .iter()
        .sorted_by_key(|k| -(k.len() as i64))
        .find(|keyword| input.contains(*keyword))
        .map(|keyword| keyword.to_string());
    if let Some(course) = &course {
        input = input.replace(course.as_str(), " ");
    }

    let dish = input
        .split_whitespace()
        .filter(|word| !FILLER_WORDS.contains(word))
        .join(" ");

    ExtractedQuery {
        dish: (!dish.is_empty()).then_some(dish),
        diet,
        course,
    }
}

/// Ranks known dish names against the query, best match first.
/// Tokens match exactly or by character-bigram similarity, so common typos
/// ("biriani" for "biryani") still find their dish.
pub fn rank_candidates(dish: &str, names: &[String]) -> Vec<String> {
    let query = dish.to_lowercase();
    let query_tokens: Vec<&str> = query.split_whitespace().collect();
    // An empty query substring-matches every name; it matches nothing
    if query_tokens.is_empty() {
        return vec![];
    }

    names
        .iter()
        .filter_map(|name| {
            let name_lower = name.to_lowercase();
            let mut score: i64 = query_tokens
                .iter()
                .copied()
                .cartesian_product(name_lower.split_whitespace())
                .filter(|&(query_token, name_token)| tokens_similar(query_token, name_token))
                .count() as i64;
            if name_lower.contains(&query) || query.contains(&name_lower) {
                score += 2;
            }
            (score > 0).then_some((name.clone(), score))
        })
        .sorted_by(|(name_a, score_a), (name_b, score_b)| {
            score_b.cmp(score_a).then_with(|| name_a.cmp(name_b))
        })
        .map(|(name, _)| name)
        .take(MAX_OPTIONS)
        .collect()
}

/// Whole-word replacement; "rajma" must not rewrite inside "rajmahal".
fn replace_word(input: &str, word: &str, replacement: &str) -> String {
    input
        .split_whitespace()
        .map(|token| if token == word { replacement } else { token })
        .join(" ")
}

fn tokens_similar(a: &str, b: &str) -> bool {
    a == b || bigram_dice(a, b) >= 0.6
}

/// Dice coefficient over character bigrams.
fn bigram_dice(a: &str, b: &str) -> f64 {
    let bigrams = |s: &str| -> Vec<(char, char)> {
        s.chars().tuple_windows().collect()
    };
    let a_bigrams = bigrams(a);
    let b_bigrams = bigrams(b);
    if a_bigrams.is_empty() || b_bigrams.is_empty() {
        return 0.0;
    }
    let mut b_remaining = b_bigrams.clone();
    let shared = a_bigrams
        .iter()
        .filter(|bigram| {
            if let Some(pos) = b_remaining.iter().position(|other| other == *bigram) {
                b_remaining.swap_remove(pos);
                true
            } else {
                false
            }
        })
        .count();
    2.0 * shared as f64 / (a_bigrams.len() + b_bigrams.len()) as f64
}
