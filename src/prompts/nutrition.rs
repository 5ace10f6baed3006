use super::goals_line;
use crate::profile::{AthleteProfile, DietaryConstraints};
use crate::util::sanitize_free_text;

const NOT_SPECIFIED: &str = "Not specified";

/// Restriction and allergy lines, or `None` when the athlete has neither.
///
/// There is no "no restrictions" placeholder: an empty set
/// leaves the clause out of the prompt.
pub fn dietary_clause(dietary: &DietaryConstraints) -> Option<String> {
    let mut lines = Vec::new();

    let tags: Vec<String> = dietary
        .restrictions
        .iter()
        .map(|r| sanitize_free_text(r))
        .filter(|r| !r.is_empty())
        .collect();
    if !tags.is_empty() {
        lines.push(format!("DIETARY RESTRICTIONS: {}", tags.join(", ")));
    }

    if let Some(allergies) = dietary.allergies.as_deref().map(sanitize_free_text) {
        if !allergies.is_empty() {
            lines.push(format!("RARE ALLERGIES: {}", allergies));
        }
    }

    if lines.is_empty() {
        None
    } else {
        lines.push("IMPORTANT: Strictly respect every restriction and allergy listed above.".to_string());
        Some(lines.join("\n"))
    }
}

pub(super) fn render(profile: &AthleteProfile) -> String {
    let sport = profile.sport.display_name();
    let dietary = dietary_clause(&profile.dietary)
        .map(|clause| format!("\n{}\n", clause))
        .unwrap_or_default();

    format!(
        r#"You are a certified sports nutritionist who plans meals for competitive {sport} athletes.

Create a DETAILED 7-day nutrition plan for a {sport} athlete.

ATHLETE PROFILE:
- Sport: {sport}
- Position: {position}
- Age: {age} years
- Weight: {weight} kg
- Height: {height} cm
- Gender: {gender}
- Training: {days} days/week
- Goals: {goals}
{dietary}
NUTRITIONAL REQUIREMENTS:
- High protein for muscle repair
- Complex carbs for sustained energy
- Healthy fats for hormone balance
- Adequate hydration

Create a COMPLETE meal plan with:

FOR EACH DAY (Monday-Sunday):
1. BREAKFAST (with portion sizes)
2. MID-MORNING SNACK
3. LUNCH (main protein + carbs + veggies)
4. PRE-WORKOUT SNACK (1-2 hours before training)
5. POST-WORKOUT MEAL (within 30 minutes after)
6. DINNER
7. BEDTIME SNACK (if needed)

Include for each meal:
- Ingredients with quantities (grams/cups)
- Simple cooking instructions
- Macronutrient breakdown
- Approximate calories

ADDITIONAL SECTIONS:
1. Weekly Grocery Shopping List
2. Hydration Schedule (when & how much to drink)
3. Meal Prep Tips
4. Budget-Friendly Alternatives

Format the answer as markdown with one `##` section per day followed by the additional sections.
"#,
        sport = sport,
        position = profile.position,
        age = profile.age,
        weight = text_or_unspecified(&profile.weight_kg),
        height = text_or_unspecified(&profile.height_cm),
        gender = profile.gender,
        days = profile.training_days,
        goals = goals_line(profile),
        dietary = dietary,
    )
}

fn text_or_unspecified(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(sanitize_free_text)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}
