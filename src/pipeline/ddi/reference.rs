use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::Severity;

/// Brand name (lowercase) → generic name.
static BRAND_NAMES: &[(&str, &str)] = &[
    // Anticoagulants
    ("coumadin", "warfarin"),
    ("jantoven", "warfarin"),
    ("eliquis", "apixaban"),
    ("xarelto", "rivaroxaban"),
    ("pradaxa", "dabigatran"),
    ("lovenox", "enoxaparin"),
    // NSAIDs
    ("advil", "ibuprofen"),
    ("motrin", "ibuprofen"),
    ("aleve", "naproxen"),
    ("naprosyn", "naproxen"),
    ("celebrex", "celecoxib"),
    ("voltaren", "diclofenac"),
    // Antiplatelets
    ("plavix", "clopidogrel"),
    // Statins
    ("lipitor", "atorvastatin"),
    ("crestor", "rosuvastatin"),
    ("zocor", "simvastatin"),
    ("pravachol", "pravastatin"),
    // Antibiotics and antifungals
    ("zithromax", "azithromycin"),
    ("z-pack", "azithromycin"),
    ("biaxin", "clarithromycin"),
    ("cipro", "ciprofloxacin"),
    ("levaquin", "levofloxacin"),
    ("flagyl", "metronidazole"),
    ("diflucan", "fluconazole"),
    ("sporanox", "itraconazole"),
    ("nizoral", "ketoconazole"),
    // Antidepressants
    ("prozac", "fluoxetine"),
    ("zoloft", "sertraline"),
    ("lexapro", "escitalopram"),
    ("celexa", "citalopram"),
    ("paxil", "paroxetine"),
    ("cymbalta", "duloxetine"),
    ("effexor", "venlafaxine"),
    // MAOIs
    ("nardil", "phenelzine"),
    ("parnate", "tranylcypromine"),
    ("marplan", "isocarboxazid"),
    // Opioids
    ("oxycontin", "oxycodone"),
    ("percocet", "oxycodone"),
    ("vicodin", "hydrocodone"),
    ("norco", "hydrocodone"),
    ("ultram", "tramadol"),
    ("duragesic", "fentanyl"),
    ("ms contin", "morphine"),
    // Benzodiazepines
    ("valium", "diazepam"),
    ("xanax", "alprazolam"),
    ("ativan", "lorazepam"),
    ("klonopin", "clonazepam"),
    // Cardiac
    ("lanoxin", "digoxin"),
    ("cordarone", "amiodarone"),
    ("pacerone", "amiodarone"),
    ("norvasc", "amlodipine"),
    ("cardizem", "diltiazem"),
    ("calan", "verapamil"),
    ("isoptin", "verapamil"),
    // ACE inhibitors and ARBs
    ("vasotec", "enalapril"),
    ("prinivil", "lisinopril"),
    ("zestril", "lisinopril"),
    ("altace", "ramipril"),
    ("cozaar", "losartan"),
    ("diovan", "valsartan"),
    // Diuretics
    ("aldactone", "spironolactone"),
    ("inspra", "eplerenone"),
    ("lasix", "furosemide"),
    ("bumex", "bumetanide"),
    ("hctz", "hydrochlorothiazide"),
    ("microzide", "hydrochlorothiazide"),
    // Diabetes
    ("glucophage", "metformin"),
    ("amaryl", "glimepiride"),
    ("glynase", "glyburide"),
    ("januvia", "sitagliptin"),
    // GI
    ("prilosec", "omeprazole"),
    ("nexium", "esomeprazole"),
    ("protonix", "pantoprazole"),
    // Other
    ("tegretol", "carbamazepine"),
    ("dilantin", "phenytoin"),
    ("synthroid", "levothyroxine"),
    ("levoxyl", "levothyroxine"),
    ("medrol", "methylprednisolone"),
];

/// Drug classes and their member generics.
static DRUG_CLASSES: &[(&str, &[&str])] = &[
    (
        "nsaid",
        &[
            "ibuprofen", "naproxen", "aspirin", "celecoxib", "diclofenac", "indomethacin",
            "meloxicam", "ketorolac", "piroxicam",
        ],
    ),
    (
        "anticoagulant",
        &["warfarin", "apixaban", "rivaroxaban", "dabigatran", "enoxaparin", "heparin"],
    ),
    (
        "ssri",
        &["fluoxetine", "sertraline", "escitalopram", "citalopram", "paroxetine", "fluvoxamine"],
    ),
    ("snri", &["duloxetine", "venlafaxine", "desvenlafaxine"]),
    ("maoi", &["phenelzine", "tranylcypromine", "isocarboxazid", "selegiline"]),
    (
        "opioid",
        &[
            "morphine", "oxycodone", "hydrocodone", "fentanyl", "tramadol", "codeine",
            "methadone", "hydromorphone",
        ],
    ),
    (
        "benzodiazepine",
        &["diazepam", "alprazolam", "lorazepam", "clonazepam", "midazolam", "temazepam"],
    ),
    (
        "statin",
        &["atorvastatin", "rosuvastatin", "simvastatin", "pravastatin", "lovastatin", "fluvastatin"],
    ),
    ("macrolide", &["azithromycin", "clarithromycin", "erythromycin"]),
    ("fluoroquinolone", &["ciprofloxacin", "levofloxacin", "moxifloxacin"]),
    ("azole_antifungal", &["fluconazole", "itraconazole", "ketoconazole", "voriconazole"]),
    ("ace_inhibitor", &["lisinopril", "enalapril", "ramipril", "captopril", "benazepril"]),
    ("arb", &["losartan", "valsartan", "irbesartan", "candesartan"]),
    ("k_sparing_diuretic", &["spironolactone", "eplerenone", "amiloride", "triamterene"]),
    (
        "corticosteroid",
        &["prednisone", "methylprednisolone", "dexamethasone", "hydrocortisone"],
    ),
];

/// One row of the interaction table. Each side names a drug or a drug class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRule {
    pub side_a: &'static str,
    pub side_b: &'static str,
    pub severity: Severity,
    pub mechanism: &'static str,
    pub recommendation: &'static str,
}

const fn rule(
    side_a: &'static str,
    side_b: &'static str,
    severity: Severity,
    mechanism: &'static str,
    recommendation: &'static str,
) -> InteractionRule {
    InteractionRule {
        side_a,
        side_b,
        severity,
        mechanism,
        recommendation,
    }
}

/// Interaction table in match order. The first matching row wins for a pair.
pub static INTERACTION_RULES: &[InteractionRule] = &[
    rule(
        "anticoagulant", "nsaid", Severity::High,
        "Combined anticoagulant + NSAID therapy significantly increases the risk of gastrointestinal and intracranial bleeding.",
        "Consider whether concurrent use is necessary; if required, add gastroprotection (PPI) and monitor INR/bleeding signs closely.",
    ),
    rule(
        "anticoagulant", "ssri", Severity::Medium,
        "SSRIs inhibit platelet aggregation, potentially increasing bleeding risk when combined with anticoagulants.",
        "Monitor for signs of bleeding; consider using a PPI for GI protection.",
    ),
    rule(
        "anticoagulant", "snri", Severity::Medium,
        "SNRIs may impair platelet function, increasing bleeding risk with concurrent anticoagulant therapy.",
        "Monitor for signs of bleeding; discuss risk-benefit with prescriber.",
    ),
    rule(
        "ssri", "maoi", Severity::High,
        "Concurrent SSRI + MAOI use can cause serotonin syndrome, a potentially fatal condition (hyperthermia, rigidity, autonomic instability).",
        "These agents should not be used together; a 14-day washout period is generally recommended.",
    ),
    rule(
        "snri", "maoi", Severity::High,
        "Concurrent SNRI + MAOI use can precipitate serotonin syndrome.",
        "These agents should not be used together; adequate washout periods are required.",
    ),
    rule(
        "opioid", "benzodiazepine", Severity::High,
        "Combined opioid + benzodiazepine use increases the risk of fatal respiratory depression (FDA Black Box Warning).",
        "Avoid concurrent use when possible; if necessary, use the lowest effective doses and monitor respiratory status.",
    ),
    rule(
        "opioid", "maoi", Severity::High,
        "Opioids (especially meperidine, tramadol, fentanyl) combined with MAOIs can cause serotonin syndrome or severe respiratory depression.",
        "Avoid combination; consider non-opioid analgesics.",
    ),
    rule(
        "ssri", "tramadol", Severity::High,
        "Tramadol has serotonergic activity; combined with SSRIs, it increases the risk of serotonin syndrome and lowers the seizure threshold.",
        "Consider alternative analgesics; monitor for agitation, hyperthermia, hyperreflexia.",
    ),
    rule(
        "methotrexate", "nsaid", Severity::High,
        "NSAIDs reduce renal clearance of methotrexate, increasing the risk of methotrexate toxicity (myelosuppression, nephrotoxicity).",
        "Monitor methotrexate levels and renal function closely; consider dose adjustment.",
    ),
    rule(
        "warfarin", "metronidazole", Severity::High,
        "Metronidazole inhibits warfarin metabolism (CYP2C9), significantly increasing INR and bleeding risk.",
        "Monitor INR closely; consider warfarin dose reduction during metronidazole therapy.",
    ),
    rule(
        "warfarin", "fluconazole", Severity::High,
        "Fluconazole is a potent CYP2C9 inhibitor, markedly increasing warfarin levels and bleeding risk.",
        "Reduce warfarin dose empirically; monitor INR within 3–5 days of starting fluconazole.",
    ),
    rule(
        "statin", "macrolide", Severity::Medium,
        "Macrolide antibiotics (especially clarithromycin, erythromycin) inhibit CYP3A4, increasing statin levels and the risk of rhabdomyolysis.",
        "Consider temporarily suspending the statin or using azithromycin (lower CYP3A4 inhibition).",
    ),
    rule(
        "statin", "azole_antifungal", Severity::Medium,
        "Azole antifungals inhibit CYP3A4, elevating statin concentrations and increasing rhabdomyolysis risk.",
        "Consider holding the statin during antifungal therapy; monitor for muscle pain/weakness.",
    ),
    rule(
        "ace_inhibitor", "k_sparing_diuretic", Severity::Medium,
        "Both ACE inhibitors and potassium-sparing diuretics increase serum potassium, risking hyperkalemia (cardiac arrhythmia).",
        "Monitor serum potassium and renal function within 1 week of co-initiation.",
    ),
    rule(
        "arb", "k_sparing_diuretic", Severity::Medium,
        "ARBs combined with potassium-sparing diuretics increase hyperkalemia risk.",
        "Monitor serum potassium and renal function regularly.",
    ),
    rule(
        "digoxin", "amiodarone", Severity::Medium,
        "Amiodarone increases digoxin levels by ~70% via P-glycoprotein inhibition, risking digoxin toxicity (nausea, arrhythmia, visual changes).",
        "Reduce digoxin dose by ~50% when starting amiodarone; monitor digoxin levels.",
    ),
    rule(
        "digoxin", "verapamil", Severity::Medium,
        "Verapamil increases digoxin levels and adds AV nodal blocking effects, risking bradycardia and heart block.",
        "Reduce digoxin dose; monitor heart rate and digoxin levels.",
    ),
    rule(
        "metformin", "fluoroquinolone", Severity::Medium,
        "Fluoroquinolones can cause unpredictable blood glucose alterations (both hypo- and hyperglycemia) in patients on metformin.",
        "Monitor blood glucose more frequently during antibiotic therapy.",
    ),
    rule(
        "corticosteroid", "nsaid", Severity::Medium,
        "Combined corticosteroid + NSAID use significantly increases the risk of GI ulceration and bleeding.",
        "Add gastroprotective therapy (PPI); use the shortest duration possible.",
    ),
    rule(
        "anticoagulant", "corticosteroid", Severity::Medium,
        "Corticosteroids may increase the risk of GI bleeding in anticoagulated patients and can affect INR unpredictably.",
        "Monitor INR and GI symptoms; consider gastroprotection.",
    ),
    rule(
        "lithium", "nsaid", Severity::Medium,
        "NSAIDs decrease renal lithium clearance, increasing lithium levels and toxicity risk (tremor, confusion, renal injury).",
        "Monitor lithium levels closely; consider using acetaminophen instead.",
    ),
    rule(
        "lithium", "ace_inhibitor", Severity::Medium,
        "ACE inhibitors reduce renal lithium clearance, potentially causing lithium toxicity.",
        "Monitor lithium levels after starting or adjusting ACE inhibitor; watch for toxicity signs.",
    ),
    rule(
        "phenytoin", "fluconazole", Severity::Medium,
        "Fluconazole inhibits CYP2C9, increasing phenytoin levels and toxicity risk (nystagmus, ataxia, altered mental status).",
        "Monitor phenytoin levels; consider dose reduction.",
    ),
    rule(
        "carbamazepine", "macrolide", Severity::Medium,
        "Macrolides inhibit CYP3A4, increasing carbamazepine levels and toxicity risk (dizziness, diplopia, ataxia).",
        "Monitor carbamazepine levels; consider using azithromycin as an alternative.",
    ),
    rule(
        "clopidogrel", "omeprazole", Severity::Medium,
        "Omeprazole inhibits CYP2C19, reducing conversion of clopidogrel to its active metabolite and potentially decreasing antiplatelet efficacy.",
        "Consider pantoprazole as an alternative PPI (lower CYP2C19 inhibition).",
    ),
    rule(
        "clopidogrel", "esomeprazole", Severity::Medium,
        "Esomeprazole inhibits CYP2C19, potentially reducing clopidogrel efficacy.",
        "Consider pantoprazole as an alternative PPI.",
    ),
];

static BRAND_LOOKUP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| BRAND_NAMES.iter().copied().collect());

static CLASS_LOOKUP: LazyLock<HashMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    for (class, members) in DRUG_CLASSES {
        for drug in *members {
            map.entry(*drug).or_default().push(*class);
        }
    }
    map
});

/// Generic name for a lowercase drug name. Unknown names pass through.
pub fn generic_name(name: &str) -> &str {
    BRAND_LOOKUP.get(name).copied().unwrap_or(name)
}

/// Classes a generic drug belongs to (possibly several, possibly none).
pub fn drug_classes(generic: &str) -> &'static [&'static str] {
    CLASS_LOOKUP
        .get(generic)
        .map(|classes| classes.as_slice())
        .unwrap_or(&[])
}

/// Whether a drug satisfies one side of a rule, by name or by class.
pub fn matches_side(drug: &str, side: &str) -> bool {
    drug == side || drug_classes(drug).contains(&side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_maps_to_generic() {
        assert_eq!(generic_name("coumadin"), "warfarin");
        assert_eq!(generic_name("ms contin"), "morphine");
    }

    #[test]
    fn unknown_name_passes_through() {
        assert_eq!(generic_name("unobtainium"), "unobtainium");
    }

    #[test]
    fn every_brand_maps_to_one_generic() {
        let mut seen = std::collections::HashSet::new();
        for (brand, _) in BRAND_NAMES {
            assert!(seen.insert(*brand), "duplicate brand entry: {brand}");
        }
    }

    #[test]
    fn aspirin_is_nsaid() {
        assert!(matches_side("aspirin", "nsaid"));
        assert!(!matches_side("aspirin", "opioid"));
    }

    #[test]
    fn direct_name_matches_side() {
        assert!(matches_side("tramadol", "tramadol"));
        assert!(matches_side("tramadol", "opioid"));
    }

    #[test]
    fn unclassified_drug_has_no_classes() {
        assert!(drug_classes("levothyroxine").is_empty());
    }

    #[test]
    fn rule_table_starts_with_bleeding_risk() {
        let first = &INTERACTION_RULES[0];
        assert_eq!((first.side_a, first.side_b), ("anticoagulant", "nsaid"));
        assert_eq!(first.severity, Severity::High);
    }
}
