/// Default snippet for compare runs when no file is given.
pub const DEFAULT_SNIPPET: &str = "def fibonacci(n):\n\
     \x20   if n <= 1:\n\
     \x20       return n\n\
     \x20   return fibonacci(n - 1) + fibonacci(n - 2)\n";

/// Small fixed corpus for bench runs. Snippets are chosen to exercise
/// different static checks rather than to be realistic programs.
pub const SNIPPETS: &[(&str, &str)] = &[
    ("fibonacci", DEFAULT_SNIPPET),
    (
        "csv_filter",
        "import csv\n\
         \n\
         def load_rows(path):\n\
         \x20   rows = []\n\
         \x20   with open(path) as handle:\n\
         \x20       for row in csv.reader(handle):\n\
         \x20           if row and row[0]:\n\
         \x20               rows.append(row)\n\
         \x20   return rows\n",
    ),
    (
        "risky_division",
        "def ratio(parts):\n\
         \x20   total = 0\n\
         \x20   for p in parts:\n\
         \x20       total = total + p\n\
         \x20   return total / 0\n",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_snippets_are_valid_targets() {
        for (name, code) in SNIPPETS {
            assert!(!code.trim().is_empty(), "snippet {name} is empty");
        }
        let report = analysis_pipeline::analyze(DEFAULT_SNIPPET, None);
        assert!(report.syntax_valid);
    }
}
