/// Splits text into hashing features.
///
/// Alphanumeric runs are lowercased; an ASCII run is one feature (a word), any
/// other run (CJK and friends, written without spaces) becomes its character
/// bigrams, or the single character for runs of length one.
pub fn features(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut run: Vec<char> = Vec::new();
    for ch in text.chars().chain(std::iter::once(' ')) {
        if ch.is_alphanumeric() {
            run.extend(ch.to_lowercase());
            continue;
        }
        flush_run(&run, &mut out);
        run.clear();
    }
    out
}

fn flush_run(run: &[char], out: &mut Vec<String>) {
    match run.len() {
        0 => {}
        _ if run.iter().all(char::is_ascii) => out.push(run.iter().collect()),
        1 => out.push(run[0].to_string()),
        _ => out.extend(run.windows(2).map(|w| w.iter().collect::<String>())),
    }
}

#[cfg(test)]
mod tests {
    use super::features;

    #[test]
    fn ascii_words_are_lowercased_whole() {
        assert_eq!(features("Hybrid SEARCH, v2!"), vec!["hybrid", "search", "v2"]);
    }

    #[test]
    fn cjk_runs_become_bigrams() {
        assert_eq!(features("检索准确"), vec!["检索", "索准", "准确"]);
        assert_eq!(features("好 LLM"), vec!["好", "llm"]);
    }

    #[test]
    fn mixed_run_without_separator_uses_bigrams() {
        assert_eq!(features("LLM工厂"), vec!["ll", "lm", "m工", "工厂"]);
    }
}
