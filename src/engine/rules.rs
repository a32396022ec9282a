//! Round and category rules: the letter draw, the default catalog, and the
//! pure form of the category-advancement gate.

use rand::Rng;

/// Letters a round can draw from.
pub const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default prompt catalog, seeded when the categories table is empty.
/// Order matters: it is the catalog order snapshotted into every game.
pub const DEFAULT_CATEGORIES: [(&str, &str); 9] = [
    ("Nome", "Nome próprio de pessoa"),
    ("Animal", "Nome de animal"),
    ("Objeto", "Objeto ou coisa"),
    ("Comida", "Alimento ou bebida"),
    ("Lugar", "Local, cidade, país, etc."),
    ("Profissão", "Ocupação ou trabalho"),
    ("Cor", "Nome de cor"),
    ("Marca", "Marca comercial"),
    ("Meu Chefe é", "Características ou descrições de chefe"),
];

/// Draw a round letter uniformly at random.
///
/// Rounds draw independently with replacement; repeats across rounds of the
/// same game are allowed.
pub fn draw_letter() -> String {
    let index = rand::thread_rng().gen_range(0..LETTERS.len());
    LETTERS[index..index + 1].to_string()
}

/// The category-advancement gate.
///
/// Advancement requires every participant to have marked themselves ready
/// for the current category AND every answer in the category to have
/// received a vote of any kind from every participant. Readiness alone is
/// not sufficient: a participant can mark ready without having voted on
/// every answer, so the per-answer vote counts are the authoritative check.
pub fn advancement_gate(
    ready_count: usize,
    participant_count: usize,
    votes_per_answer: &[usize],
) -> bool {
    if participant_count == 0 || ready_count < participant_count {
        return false;
    }
    votes_per_answer
        .iter()
        .all(|&votes| votes >= participant_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_letter_is_single_uppercase() {
        for _ in 0..100 {
            let letter = draw_letter();
            assert_eq!(letter.len(), 1);
            assert!(LETTERS.contains(&letter));
        }
    }

    #[test]
    fn test_gate_requires_all_ready() {
        // Two of three players ready, all answers fully voted
        assert!(!advancement_gate(2, 3, &[3, 3, 3]));
        assert!(advancement_gate(3, 3, &[3, 3, 3]));
    }

    #[test]
    fn test_gate_readiness_alone_is_insufficient() {
        // Everyone marked ready but one answer is missing a vote
        assert!(!advancement_gate(3, 3, &[3, 2, 3]));
    }

    #[test]
    fn test_gate_no_participants() {
        assert!(!advancement_gate(0, 0, &[]));
    }

    #[test]
    fn test_gate_no_answers_in_category() {
        // Nothing to vote on: readiness decides by itself
        assert!(advancement_gate(2, 2, &[]));
    }

    #[test]
    fn test_gate_extra_votes_are_fine() {
        assert!(advancement_gate(2, 2, &[2, 5]));
    }
}
