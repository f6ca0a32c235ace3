//! Which questionnaires an evaluation needs, by age band.

use serde::Serialize;

use crate::models::{DiagnosisCategory, EvaluationType, QuestionnaireType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "questionnaires", rename_all = "snake_case")]
pub enum Requirement {
    TooYoung,
    Questionnaires(Vec<QuestionnaireType>),
    /// The clinic has no questionnaire set for this combination.
    Unsupported,
}

/// Look up the questionnaires required for an evaluation.
///
/// `vineland_on_file` swaps the Vineland for an ASRS when a recent Vineland
/// already exists for the client. Combined ASD+ADHD referrals follow the ASD
/// table for EVAL and DA.
pub fn required_questionnaires(
    age_years: i16,
    diagnosis: DiagnosisCategory,
    evaluation: EvaluationType,
    vineland_on_file: bool,
) -> Requirement {
    use QuestionnaireType::*;

    match (evaluation, diagnosis) {
        (EvaluationType::Eval, DiagnosisCategory::Asd | DiagnosisCategory::Both) => {
            let adaptive = |asrs: QuestionnaireType| if vineland_on_file { asrs } else { Vineland };
            let set = match age_years {
                a if a < 2 => return Requirement::TooYoung,
                a if a < 6 => vec![Dp4, BascPreschool, ConnersEc, adaptive(Asrs2To5)],
                a if a < 12 => vec![BascChild, Conners4, adaptive(Asrs6To18)],
                a if a < 18 => vec![BascAdolescent, Conners4Self, Conners4, adaptive(Asrs6To18)],
                a if a < 19 => vec![Abas3, BascAdolescent, Pai, Caars2, adaptive(Asrs6To18)],
                a if a < 22 => vec![Abas3, BascAdolescent, Srs2, Caars2, Pai],
                _ => vec![Abas3, Srs2, Caars2, Pai],
            };
            Requirement::Questionnaires(set)
        }
        (EvaluationType::Eval, DiagnosisCategory::Adhd) => Requirement::Unsupported,
        (EvaluationType::Da, DiagnosisCategory::Asd | DiagnosisCategory::Both) => {
            let set = match age_years {
                a if a < 2 => return Requirement::TooYoung,
                a if a < 6 => vec![Asrs2To5],
                a if a < 19 => vec![Asrs6To18],
                _ => vec![SrsSelf],
            };
            Requirement::Questionnaires(set)
        }
        (EvaluationType::Da, DiagnosisCategory::Adhd) => {
            let set = match age_years {
                a if a < 4 => return Requirement::TooYoung,
                a if a < 6 => vec![ConnersEc],
                a if a < 12 => vec![Conners4],
                a if a < 18 => vec![Conners4, Conners4Self],
                _ => vec![Caars2],
            };
            Requirement::Questionnaires(set)
        }
        (EvaluationType::DaEval, _) => {
            let set = match age_years {
                a if a < 2 => return Requirement::TooYoung,
                a if a < 6 => vec![Asrs2To5, Vineland, Dp4, BascPreschool, ConnersEc],
                a if a < 12 => vec![Asrs6To18, Vineland, BascChild, Conners4],
                a if a < 18 => vec![Asrs6To18, Vineland, BascAdolescent, Conners4Self, Conners4],
                a if a < 19 => vec![Asrs6To18, Vineland, Abas3, BascAdolescent, Pai, Caars2],
                a if a < 22 => vec![SrsSelf, Abas3, BascAdolescent, Srs2, Caars2, Pai],
                _ => vec![SrsSelf, Abas3, Srs2, Caars2, Pai],
            };
            Requirement::Questionnaires(set)
        }
    }
}
