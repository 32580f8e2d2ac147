/// Sample reference data. This is not a complete billing code database.

use super::{Catalog, CodeRecord, CodeSystem, CodeTable};

const CPT: CodeTable = &[
    (
        "99213",
        CodeRecord {
            description: "Office/outpatient visit, established patient, 20-29 minutes",
            category: "Evaluation and Management",
            typical_reimbursement: Some("$93-$130"),
        },
    ),
    (
        "99214",
        CodeRecord {
            description: "Office/outpatient visit, established patient, 30-39 minutes",
            category: "Evaluation and Management",
            typical_reimbursement: Some("$131-$184"),
        },
    ),
    (
        "90837",
        CodeRecord {
            description: "Psychotherapy, 60 minutes",
            category: "Mental Health",
            typical_reimbursement: Some("$120-$170"),
        },
    ),
];

const ICD10: CodeTable = &[
    (
        "E11.9",
        CodeRecord {
            description: "Type 2 diabetes mellitus without complications",
            category: "Endocrine/Metabolic",
            typical_reimbursement: None,
        },
    ),
    (
        "I10",
        CodeRecord {
            description: "Essential (primary) hypertension",
            category: "Circulatory",
            typical_reimbursement: None,
        },
    ),
    (
        "M25.511",
        CodeRecord {
            description: "Pain in right shoulder",
            category: "Musculoskeletal",
            typical_reimbursement: None,
        },
    ),
];

const HCPCS: CodeTable = &[
    (
        "J3490",
        CodeRecord {
            description: "Unclassified drugs",
            category: "Drug Administration",
            typical_reimbursement: None,
        },
    ),
    (
        "Q4081",
        CodeRecord {
            description: "Injection, epoetin alfa, biosimilar",
            category: "Biologics",
            typical_reimbursement: None,
        },
    ),
];

/// Built-in catalog. Table order here is the search order.
pub static BUILTIN: Catalog = Catalog::new(&[
    (CodeSystem::Cpt, CPT),
    (CodeSystem::Icd10, ICD10),
    (CodeSystem::Hcpcs, HCPCS),
]);
