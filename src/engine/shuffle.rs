use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShuffleMode {
    None,
    Full,
    SectionsOnly,
}

/// Applies the exam's shuffle policy once, at session start. `SectionsOnly`
/// keeps sections in order of first appearance and shuffles within each.
pub(crate) fn apply(mode: ShuffleMode, questions: Vec<Question>, rng: &mut impl Rng) -> Vec<Question> {
    match mode {
        ShuffleMode::None => questions,
        ShuffleMode::Full => {
            let mut shuffled = questions;
            shuffled.shuffle(rng);
            shuffled
        }
        ShuffleMode::SectionsOnly => {
            let mut partitions: Vec<(Option<String>, Vec<Question>)> = Vec::new();
            for question in questions {
                match partitions.iter_mut().find(|(key, _)| *key == question.section) {
                    Some((_, bucket)) => bucket.push(question),
                    None => partitions.push((question.section.clone(), vec![question])),
                }
            }

            let mut result = Vec::new();
            for (_, mut bucket) in partitions {
                bucket.shuffle(rng);
                result.append(&mut bucket);
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: &str, section: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            text: format!("question {id}"),
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 0,
            section: section.map(|s| s.to_string()),
            explanation: None,
        }
    }

    fn ids(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.id.as_str()).collect()
    }

    #[test]
    fn mode_none_is_identity() {
        let questions = vec![question("1", None), question("2", None), question("3", None)];
        let mut rng = StdRng::seed_from_u64(7);

        let result = apply(ShuffleMode::None, questions.clone(), &mut rng);
        assert_eq!(ids(&result), ids(&questions));
    }

    #[test]
    fn full_shuffle_is_a_permutation() {
        let questions: Vec<Question> =
            (1..=20).map(|n| question(&n.to_string(), None)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let result = apply(ShuffleMode::Full, questions.clone(), &mut rng);
        assert_eq!(result.len(), questions.len());

        let mut sorted: Vec<&str> = ids(&result);
        sorted.sort_unstable();
        let mut expected: Vec<&str> = ids(&questions);
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn sections_only_preserves_section_order_and_membership() {
        let questions = vec![
            question("p1", Some("physics")),
            question("p2", Some("physics")),
            question("c1", Some("chemistry")),
            question("c2", Some("chemistry")),
            question("p3", Some("physics")),
        ];
        let mut rng = StdRng::seed_from_u64(42);

        let result = apply(ShuffleMode::SectionsOnly, questions, &mut rng);

        let sections: Vec<Option<&str>> =
            result.iter().map(|q| q.section.as_deref()).collect();
        assert_eq!(
            sections,
            vec![
                Some("physics"),
                Some("physics"),
                Some("physics"),
                Some("chemistry"),
                Some("chemistry")
            ]
        );

        let mut physics: Vec<&str> =
            result.iter().filter(|q| q.section.as_deref() == Some("physics")).map(|q| q.id.as_str()).collect();
        physics.sort_unstable();
        assert_eq!(physics, vec!["p1", "p2", "p3"]);
    }
}
