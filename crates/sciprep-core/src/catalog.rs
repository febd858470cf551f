//! Static reference data: the topic catalog and the initial progress seed.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{Subject, TopicNode, UserProgress};

/// Topics for grade 9-10 science-class entrance exams, in catalog order.
pub const TOPICS: &[TopicNode] = &[
    TopicNode {
        id: "math_num",
        name: "Number Theory and Congruences",
        subject: Subject::Math,
        description: "Modular arithmetic, basics of Fermat's little theorem",
    },
    TopicNode {
        id: "math_geo",
        name: "Advanced Plane Geometry",
        subject: Subject::Math,
        description: "Power of a point, Menelaus' theorem",
    },
    TopicNode {
        id: "math_poly",
        name: "Polynomials and Functions",
        subject: Subject::Math,
        description: "Roots and coefficients, interpolating polynomials",
    },
    TopicNode {
        id: "phy_mec",
        name: "Applied Newtonian Mechanics",
        subject: Subject::Physics,
        description: "Inclines, pulleys, and friction combined",
    },
    TopicNode {
        id: "phy_energy",
        name: "Work and Energy",
        subject: Subject::Physics,
        description: "Conservation of mechanical energy, elastic collisions",
    },
    TopicNode {
        id: "phy_elec",
        name: "Basic Circuits",
        subject: Subject::Physics,
        description: "Introductory Kirchhoff's laws, electric power",
    },
    TopicNode {
        id: "chem_stoich",
        name: "Stoichiometry",
        subject: Subject::Chemistry,
        description: "Limiting reagents, concentration conversions",
    },
    TopicNode {
        id: "chem_gas",
        name: "Gas Laws",
        subject: Subject::Chemistry,
        description: "Ideal gas equation, partial pressures",
    },
    TopicNode {
        id: "chem_acid",
        name: "Acids, Bases, and Salts",
        subject: Subject::Chemistry,
        description: "pH calculations, neutralization titration",
    },
    TopicNode {
        id: "bio_cell",
        name: "Cell Physiology",
        subject: Subject::Biology,
        description: "Organelle functions, osmotic pressure",
    },
    TopicNode {
        id: "bio_gen",
        name: "Laws of Inheritance",
        subject: Subject::Biology,
        description: "Mendelian and sex-linked inheritance",
    },
];

/// Subject selected before the user picks anything.
pub const DEFAULT_SUBJECT: Subject = Subject::Math;

/// Look up a topic by id.
pub fn find_topic(id: &str) -> Option<&'static TopicNode> {
    TOPICS.iter().find(|t| t.id == id)
}

/// Topics of one subject, in catalog order.
pub fn topics_for(subject: Subject) -> impl Iterator<Item = &'static TopicNode> {
    TOPICS.iter().filter(move |t| t.subject == subject)
}

/// The starting progress of a fresh process.
pub fn initial_progress(today: NaiveDate) -> UserProgress {
    let subject_mastery = BTreeMap::from([
        (Subject::Math, 20),
        (Subject::Physics, 15),
        (Subject::Chemistry, 10),
        (Subject::Biology, 5),
    ]);

    UserProgress {
        xp: 0,
        level: 1,
        streak: 1,
        last_login_date: today,
        subject_mastery,
        topic_mastery: BTreeMap::new(),
        recent_activity: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in TOPICS.iter().enumerate() {
            for b in &TOPICS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn every_subject_has_topics() {
        for subject in Subject::ALL {
            assert!(topics_for(subject).next().is_some(), "{subject} has no topics");
        }
        assert_eq!(topics_for(Subject::Biology).count(), 2);
    }

    #[test]
    fn find_topic_by_id() {
        let topic = find_topic("phy_elec").unwrap();
        assert_eq!(topic.subject, Subject::Physics);
        assert!(find_topic("nope").is_none());
    }

    #[test]
    fn initial_progress_seed() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let progress = initial_progress(today);
        assert_eq!(progress.xp(), 0);
        assert_eq!(progress.level(), 1);
        assert_eq!(progress.streak(), 1);
        assert_eq!(progress.subject_mastery(Subject::Math), 20);
        assert_eq!(progress.subject_mastery(Subject::Biology), 5);
        assert!(progress.recent_activity().is_empty());
        assert_eq!(progress.topic_status("math_num"), crate::model::TopicStatus::Locked);
    }
}
