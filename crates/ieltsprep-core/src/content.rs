//! Embedded content: the fallback exam variant and the practice lesson.
//!
//! The fallback variant is used whenever the remote store cannot provide
//! `exams/variant_1`, and is what gets seeded into the store when the
//! document is missing.

use crate::model::{ExamContent, Question, QuestionKind};

const STEPWELLS_ID: &str = "ielts_mock_stepwells_full";
const STEPWELLS_TITLE: &str = "Stepwells";

const STEPWELLS_TEXT: &str = "A millennium ago, stepwells were fundamental to life in the driest parts of India. Although many have been neglected, recent restoration has returned them to their former glory. Richard Cox travelled to north-western India to document these spectacular monuments from a bygone era.

During the sixth and seventh centuries, the inhabitants of the modern-day states of Gujarat and Rajasthan in North-western India developed a method of gaining access to clean, fresh groundwater during the dry season for drinking, bathing, watering animals and irrigation. However, the significance of this invention – the stepwell – goes beyond its utilitarian application.

Unique to the region, stepwells are often architecturally complex and vary widely in size and shape. During their heyday, they were places of gathering, of leisure, of relaxation and of worship for villagers of all but the lowest castes. Most stepwells are found dotted around the desert areas of Gujarat (where they are called vav) and Rajasthan (where they are known as baori), while a few also survive in Delhi. Some were located in or near villages as public spaces for the community; others were positioned beside roads as resting places for travellers.

As their name suggests, stepwells comprise a series of stone steps descending from ground level to the water source (normally an underground aquifer) as it recedes following the rains. When the water level was high, the user needed only to descend a few steps to reach it; when it was low, several levels would have to be negotiated.

Some wells are vast, open craters with hundreds of steps paving each sloping side, often in tiers. Others are more elaborate, with long stepped passages leading to the water via several storeys. Built from stone and supported by pillars, they also included pavilions that sheltered visitors from the relentless heat. But perhaps the most impressive features are the intricate decorative sculptures that embellish many stepwells, showing activities from fighting and dancing to everyday acts such as women combing their hair and churning butter.

Down the centuries, thousands of wells were constructed throughout northwestern India, but the majority have now fallen into disuse; many are derelict and dry, as groundwater has been diverted for industrial use and the wells no longer reach the water table. Their condition hasn’t been helped by recent dry spells: southern Rajasthan suffered an eight-year drought between 1996 and 2004.

However, some important sites in Gujarat have recently undergone major restoration, and the state government announced in June last year that it plans to restore the stepwells throughout the state.

In Patan, the state’s ancient capital, the stepwell of Rani Ki Vav (Queen’s Stepwell) is perhaps the finest current example. It was built by Queen Udayamati during the late 11th century, but became silted up following a flood during the 13th century. But the Archaeological Survey of India began restoring it in the 1960s, and today it’s in pristine condition. At 65 metres long, 20 metres wide and 27 metres deep, Rani Ki Vav features 500 distinct sculptures carved into niches throughout the monument, depicting gods such as Vishnu and Parvati in various incarnations. Incredibly, in January 2001, this ancient structure survived a devastating earthquake that measured 7.6 on the Richter scale.

Another example is the Surya Kund in Modhera, northern Gujarat, next to the Sun Temple, built by King Bhima I in 1026 to honour the sun god Surya. It’s actually a tank (kund means reservoir or pond) rather than a well, but displays the hallmarks of stepwell architecture, including four sides of steps that descend to the bottom in a stunning geometrical formation. The terraces house 108 small, intricately carved shrines between the sets of steps.

Rajasthan also has a wealth of wells. The ancient city of Bundi, 200 kilometres south of Jaipur, is renowned for its architecture, including its stepwells. One of the larger examples is Raniji Ki Baori, which was built by the queen of the region, Nathavatji, in 1699. At 46 metres deep, 20 metres wide and 40 metres long, the intricately carved monument is one of 21 baoris commissioned in the Bundi area by Nathavatji.

In the old ruined town of Abhaneri, about 95 kilometres east of Jaipur, is Chand Baori, one of India’s oldest and deepest wells; aesthetically, it’s perhaps one of the most dramatic. Built in around 850 AD next to the temple of Harshat Mata, the baori comprises hundreds of zigzagging steps that run along three of its sides, steeply descending 11 storeys, resulting in a striking geometric pattern when seen from afar. On the fourth side, covered verandas supported by ornate pillars overlook the steps.

Still in public use is Neemrana Ki Baori, located just off the Jaipur–Dehli highway. Constructed in around 1700, it’s nine storeys deep, with the last two levels underwater. At ground level, there are 86 colonnaded openings from where the visitor descends 170 steps to the deepest water source.";

const TRUE_FALSE_NOT_GIVEN: [&str; 3] = ["True", "False", "Not Given"];

/// The writing task shown in the writing section.
pub const WRITING_TASK: &str = "Some people think that universities should provide graduates with the knowledge and skills needed in the workplace. To what extent do you agree?";

fn multiple_choice(id: u32, prompt: &str, correct: &str) -> Question {
    Question {
        id,
        kind: QuestionKind::MultipleChoice,
        prompt: prompt.to_string(),
        options: Some(TRUE_FALSE_NOT_GIVEN.iter().map(|o| o.to_string()).collect()),
        correct_answer: correct.to_string(),
    }
}

fn text_input(id: u32, prompt: &str, correct: &str) -> Question {
    Question {
        id,
        kind: QuestionKind::TextInput,
        prompt: prompt.to_string(),
        options: None,
        correct_answer: correct.to_string(),
    }
}

/// The built-in exam variant.
pub fn fallback_exam() -> ExamContent {
    ExamContent {
        id: STEPWELLS_ID.to_string(),
        title: STEPWELLS_TITLE.to_string(),
        text: STEPWELLS_TEXT.to_string(),
        questions: vec![
            multiple_choice(
                1,
                "1. Examples of ancient stepwells can be found all over the world.",
                "False",
            ),
            multiple_choice(
                2,
                "2. Stepwells had a range of functions, in addition to those related to water collection.",
                "True",
            ),
            multiple_choice(
                3,
                "3. The few existing stepwells in Delhi are more attractive than those found elsewhere.",
                "Not Given",
            ),
            multiple_choice(
                4,
                "4. It took workers many years to build the stone steps characteristic of stepwells.",
                "Not Given",
            ),
            multiple_choice(
                5,
                "5. The number of steps above the water level in a stepwell altered during the course of a year.",
                "True",
            ),
            text_input(
                6,
                "6. Which part of some stepwells provided shade for people?",
                "pavilions",
            ),
            text_input(
                7,
                "7. What type of serious climatic event, which took place in southern Rajasthan, is mentioned in the article?",
                "drought",
            ),
            text_input(8, "8. Who are frequent visitors to stepwells nowadays?", "tourists"),
            text_input(
                9,
                "9. Rani Ki Vav: Restored in the 1960s. Excellent condition, despite the ___ of 2001.",
                "earthquake",
            ),
            text_input(
                10,
                "10. Surya Kund: Steps on the ___ produce a geometric pattern.",
                "four sides",
            ),
            text_input(11, "11. Surya Kund: Looks more like a ___ than a well.", "tank"),
            text_input(
                12,
                "12. Chand Baori: Has ___ which provide a view to the steps.",
                "verandas",
            ),
            text_input(13, "13. Neemrana Ki Baori: Has two ___ levels.", "underwater"),
        ],
    }
}

/// A short reading lesson used by practice sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub title: String,
    pub section: crate::model::Section,
    pub text: String,
    pub questions: Vec<LessonQuestion>,
}

/// Multiple-choice question answered by option index.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonQuestion {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

/// The built-in practice lesson.
pub fn practice_lesson() -> Lesson {
    Lesson {
        title: "The Great Barrier Reef".to_string(),
        section: crate::model::Section::Reading,
        text: "The Great Barrier Reef is the world's largest coral reef system composed of over 2,900 individual reefs and 900 islands stretching for over 2,300 kilometres over an area of approximately 344,400 square kilometres. The reef is located in the Coral Sea, off the coast of Queensland, Australia. The Great Barrier Reef can be seen from outer space and is the world's biggest single structure made by living organisms. This reef structure is composed of and built by billions of tiny organisms, known as coral polyps.".to_string(),
        questions: vec![
            LessonQuestion {
                id: 1,
                prompt: "Where is the Great Barrier Reef located?".to_string(),
                options: vec![
                    "In the Pacific Ocean, near Japan".to_string(),
                    "In the Coral Sea, off the coast of Australia".to_string(),
                    "In the Indian Ocean, near Indonesia".to_string(),
                    "In the Atlantic Ocean, near Brazil".to_string(),
                ],
                correct_option: 1,
            },
            LessonQuestion {
                id: 2,
                prompt: "What builds the structure of the Great Barrier Reef?".to_string(),
                options: vec![
                    "Volcanic activity".to_string(),
                    "Ocean currents".to_string(),
                    "Billions of tiny organisms called coral polyps".to_string(),
                    "Human intervention".to_string(),
                ],
                correct_option: 2,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::READING_QUESTION_COUNT;

    #[test]
    fn fallback_has_thirteen_unique_questions() {
        let exam = fallback_exam();
        assert_eq!(exam.questions.len(), READING_QUESTION_COUNT);
        let mut ids: Vec<u32> = exam.questions.iter().map(|q| q.id).collect();
        ids.dedup();
        assert_eq!(ids, (1..=13).collect::<Vec<_>>());
    }

    #[test]
    fn multiple_choice_answers_are_among_options() {
        for q in fallback_exam().questions {
            if let Some(options) = &q.options {
                assert!(options.contains(&q.correct_answer), "question {}", q.id);
            }
        }
    }

    #[test]
    fn fallback_survives_json_roundtrip() {
        let exam = fallback_exam();
        let json = serde_json::to_value(&exam).unwrap();
        assert_eq!(json["questions"][5]["type"], "text_input");
        let back: ExamContent = serde_json::from_value(json).unwrap();
        assert_eq!(back, exam);
    }

    #[test]
    fn lesson_answer_key_in_range() {
        let lesson = practice_lesson();
        for q in &lesson.questions {
            assert!(q.correct_option < q.options.len());
        }
    }
}
