//! Learner personas: profile descriptors, the rule-based persona resolver,
//! and reconciliation of raw K-Means clusters against resolved personas

use crate::data::StudentRecord;
use crate::model::{euclidean_distance, KMeansModel};
use ndarray::Array1;
use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptor for one learner persona shown on the dashboard
#[derive(Debug, Serialize)]
pub struct PersonaProfile {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub strategies: [&'static str; 5],
}

/// The five learner personas, indexed by persona id
pub static PERSONA_PROFILES: [PersonaProfile; 5] = [
    PersonaProfile {
        name: "Driven Achiever",
        icon: "🚀",
        color: "#7C3AED",
        description: "High study hours, excellent attendance, strong motivation. These students consistently perform at the top.",
        strategies: [
            "Offer advanced challenge projects and enrichment tasks to maintain engagement.",
            "Assign peer mentoring roles to reinforce their own learning through teaching.",
            "Provide access to competitions (Olympiads, subject fairs) and external programs.",
            "Give autonomy in project-based learning — they thrive with creative freedom.",
            "Regularly celebrate milestones to sustain intrinsic motivation long-term.",
        ],
    },
    PersonaProfile {
        name: "Consistent Worker",
        icon: "📚",
        color: "#0EA5E9",
        description: "Steady attendance and moderate study hours. Reliable performers who respond well to structured learning.",
        strategies: [
            "Use structured study plans and weekly goal-setting exercises.",
            "Introduce spaced repetition tools (flashcards, quizzes) for retention.",
            "Leverage collaborative study groups — they excel when paired with peers.",
            "Offer regular, specific feedback to help them identify precise gaps.",
            "Introduce slightly harder problems progressively to build confidence.",
        ],
    },
    PersonaProfile {
        name: "Passive Coaster",
        icon: "🌊",
        color: "#F59E0B",
        description: "Average attendance and minimal study effort. These students coast without clear academic direction.",
        strategies: [
            "Connect curriculum topics to real-world interests and career relevance.",
            "Use gamified learning (points, leaderboards) to spark engagement.",
            "Check in one-on-one to understand hidden barriers or personal challenges.",
            "Break tasks into short, achievable micro-goals to build momentum.",
            "Introduce choice in assignments to restore a sense of ownership.",
        ],
    },
    PersonaProfile {
        name: "Struggling Learner",
        icon: "🆘",
        color: "#EF4444",
        description: "Low attendance, lower previous scores, and limited resources. High risk of falling behind without support.",
        strategies: [
            "Assign a dedicated mentor or tutor for weekly one-on-one sessions.",
            "Coordinate with parents/guardians to reinforce learning at home.",
            "Use multi-modal teaching (videos, hands-on activities) to suit diverse styles.",
            "Ensure access to school resources: library, devices, tutoring programs.",
            "Create safe, judgment-free classroom environments to reduce anxiety.",
        ],
    },
    PersonaProfile {
        name: "Potential Bloomer",
        icon: "🌱",
        color: "#10B981",
        description: "High previous scores but lower current engagement or attendance. Untapped potential waiting to be unlocked.",
        strategies: [
            "Investigate recent disengagement — personal, social, or academic triggers.",
            "Reignite curiosity with exploratory, discovery-based learning activities.",
            "Connect them with inspiring role models or alumni in their interest area.",
            "Flexible deadlines and project alternatives reduce pressure triggers.",
            "Offer leadership roles (class rep, project lead) to rebuild confidence.",
        ],
    },
];

/// One of the five learner personas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    DrivenAchiever,
    ConsistentWorker,
    PassiveCoaster,
    StrugglingLearner,
    PotentialBloomer,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::DrivenAchiever,
        Persona::ConsistentWorker,
        Persona::PassiveCoaster,
        Persona::StrugglingLearner,
        Persona::PotentialBloomer,
    ];

    /// Persona id, the index into `PERSONA_PROFILES`
    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Persona> {
        Persona::ALL.get(id).copied()
    }

    pub fn profile(self) -> &'static PersonaProfile {
        &PERSONA_PROFILES[self.id()]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

/// Assign a learner persona from current exam score, attendance, and
/// previous score.
///
/// This is the classification authority; the unsupervised clusters are only
/// advisory. Score bands are evaluated top to bottom and the first matching
/// rule wins, so the ordering below is load-bearing. Above 75 the persona is
/// unconditionally Driven Achiever; below 63 only Struggling Learner or
/// Potential Bloomer (recovering from past strength) are possible.
pub fn resolve_persona(record: &StudentRecord) -> Persona {
    let score = record.exam_score;
    let attendance = record.attendance;
    let previous = record.previous_scores;

    if score < 63.0 {
        if previous >= 78.0 {
            Persona::PotentialBloomer
        } else {
            Persona::StrugglingLearner
        }
    } else if score < 70.0 {
        if attendance >= 85.0 {
            Persona::ConsistentWorker
        } else if previous >= 80.0 && score < previous - 8.0 {
            Persona::PotentialBloomer
        } else if attendance >= 75.0 {
            Persona::PassiveCoaster
        } else if attendance < 72.0 {
            Persona::StrugglingLearner
        } else {
            Persona::PassiveCoaster
        }
    } else if score < 75.0 {
        if attendance >= 82.0 {
            Persona::DrivenAchiever
        } else if attendance >= 72.0 {
            Persona::ConsistentWorker
        } else if previous >= 78.0 {
            Persona::PotentialBloomer
        } else {
            Persona::StrugglingLearner
        }
    } else {
        Persona::DrivenAchiever
    }
}

/// Raw clusters reconciled against resolved personas
#[derive(Debug, Clone)]
pub struct PersonaReconciliation {
    /// Majority persona of each raw cluster, indexed by cluster id
    pub cluster_personas: Vec<Persona>,
    /// Winning raw cluster per persona id; on collision the highest cluster
    /// id wins (ascending iteration order)
    pub persona_clusters: BTreeMap<usize, usize>,
    /// Representative centroid per persona id, in normalized space
    pub persona_centers: BTreeMap<usize, Array1<f64>>,
}

impl PersonaReconciliation {
    /// Persona whose representative centroid is nearest to a normalized
    /// feature vector; `None` when no persona won a cluster
    pub fn predict_persona(&self, features: &Array1<f64>) -> Option<Persona> {
        let mut best_persona = None;
        let mut min_distance = f64::INFINITY;
        for (&persona_id, center) in &self.persona_centers {
            let distance = euclidean_distance(&features.view(), &center.view());
            if distance < min_distance {
                min_distance = distance;
                best_persona = Persona::from_id(persona_id);
            }
        }
        best_persona
    }
}

/// Map each raw cluster to the most frequent persona among its members
///
/// Tied votes go to the lowest persona id. The persona centroid map is built
/// in ascending cluster order, so when two clusters share a majority persona
/// the later cluster's centroid wins. Personas that win no cluster get no
/// centroid entry. Record-level persona labels are never altered here.
pub fn reconcile_clusters(model: &KMeansModel, personas: &[Persona]) -> PersonaReconciliation {
    let mut cluster_personas = Vec::with_capacity(model.n_clusters);
    let mut persona_clusters = BTreeMap::new();
    let mut persona_centers = BTreeMap::new();

    for cluster in 0..model.n_clusters {
        let mut votes = [0usize; 5];
        for (i, &label) in model.labels.iter().enumerate() {
            if label == cluster {
                votes[personas[i].id()] += 1;
            }
        }

        let mut majority = Persona::DrivenAchiever;
        for persona in Persona::ALL {
            if votes[persona.id()] > votes[majority.id()] {
                majority = persona;
            }
        }

        cluster_personas.push(majority);
        persona_clusters.insert(majority.id(), cluster);
        persona_centers.insert(majority.id(), model.centroids.row(cluster).to_owned());
    }

    PersonaReconciliation {
        cluster_personas,
        persona_clusters,
        persona_centers,
    }
}
