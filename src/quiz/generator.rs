//! Builds a quiz from the stored vocabulary.
//!
//! Generation is a one-shot batch: load everything, drop rows that cannot be
//! shown, keep the least recently studied sighting of every word, order the
//! words oldest-first and turn the first `cohort_size` of them into
//! multiple-choice questions. Anything that cannot become a question is
//! skipped, so the result may be shorter than the cohort or empty.

use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};

use anyhow::{Context, Result};
use rand::{seq::SliceRandom, Rng};

use crate::db::{ExampleSentence, Photo, WordObject};
use crate::store::{FileProbe, VocabularyStore};

use super::{
    config::QuizConfig,
    models::{GeneratedQuiz, QuizQuestion},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Everything generation reads from the store, fetched up front.
#[derive(Debug, Clone, Default)]
pub struct VocabularySnapshot {
    pub photos: Vec<Photo>,
    pub word_objects: Vec<WordObject>,
    pub example_sentences: Vec<ExampleSentence>,
}

/// All sightings of one word, in store order.
#[derive(Debug)]
pub struct VocabularyEntry<'a> {
    pub key: String,
    pub members: Vec<&'a WordObject>,
}

impl<'a> VocabularyEntry<'a> {
    /// The sighting reviewed longest ago; the first one in store order on ties.
    pub fn representative(&self) -> Option<&'a WordObject> {
        self.members.iter().copied().min_by_key(|o| o.last_studied)
    }
}

pub async fn load_snapshot(store: &dyn VocabularyStore) -> Result<VocabularySnapshot> {
    Ok(VocabularySnapshot {
        photos: store
            .get_all_photos()
            .await
            .context("failed to load photos")?,
        word_objects: store
            .get_all_word_objects()
            .await
            .context("failed to load word objects")?,
        example_sentences: store
            .get_all_example_sentences()
            .await
            .context("failed to load example sentences")?,
    })
}

/// Reads the store and builds the questions in one go.
///
/// File checks run on the calling thread; see `QuizController` for the
/// variant that keeps them off the async runtime.
pub async fn generate_questions<R>(
    store: &dyn VocabularyStore,
    files: &dyn FileProbe,
    config: &QuizConfig,
    rng: &mut R,
) -> Result<GeneratedQuiz>
where
    R: Rng + Send + ?Sized,
{
    let snapshot = load_snapshot(store).await?;
    Ok(build_questions(&snapshot, files, config, rng))
}

pub fn build_questions<R>(
    snapshot: &VocabularySnapshot,
    files: &dyn FileProbe,
    config: &QuizConfig,
    rng: &mut R,
) -> GeneratedQuiz
where
    R: Rng + ?Sized,
{
    let started = Instant::now();
    let photos: HashMap<i64, &Photo> = snapshot.photos.iter().map(|p| (p.id, p)).collect();

    let eligible = eligible_word_objects(&snapshot.word_objects, &photos, files);
    if eligible.is_empty() {
        log_info!(
            "No quiz available: none of {} word objects is eligible",
            snapshot.word_objects.len()
        );
        return GeneratedQuiz::default();
    }

    let entries = group_by_word(eligible.iter().copied());
    let cohort = select_cohort(&entries, config.cohort_size);

    let all_entries = group_by_word(snapshot.word_objects.iter());
    let stored_vocabulary = spellings(&all_entries);
    let sightings: HashMap<&str, &[&WordObject]> = all_entries
        .iter()
        .map(|entry| (entry.key.as_str(), entry.members.as_slice()))
        .collect();
    let mut sentences_by_object: HashMap<i64, Vec<&ExampleSentence>> = HashMap::new();
    for sentence in &snapshot.example_sentences {
        sentences_by_object
            .entry(sentence.word_object_id)
            .or_default()
            .push(sentence);
    }

    let vocabulary = spellings(&entries);
    let mut words_by_photo: HashMap<i64, HashSet<String>> = HashMap::new();
    for object in &eligible {
        words_by_photo
            .entry(object.photo_id)
            .or_default()
            .insert(object.key());
    }

    let mut quiz = GeneratedQuiz::default();
    for target in cohort {
        // Files can disappear between the eligibility pass and now.
        let image_path = photos
            .get(&target.photo_id)
            .and_then(|photo| photo.local_path())
            .filter(|path| files.file_exists(path));
        let Some(image_path) = image_path else {
            log_debug!("Skipping '{}': image for photo {} is gone", target.word, target.photo_id);
            continue;
        };

        let key = target.key();
        let pools = DistractorPools {
            eligible: &vocabulary,
            stored: &stored_vocabulary,
            words_by_photo: &words_by_photo,
        };
        let distractors = pools.pick(target, config.distractor_count.max(1), rng);
        if distractors.is_empty() {
            log_debug!("Skipping '{}': no other word to use as a distractor", target.word);
            continue;
        }

        let (example_sentence, example_translation) = sightings
            .get(key.as_str())
            .and_then(|members| pick_example(target, members, &sentences_by_object, rng))
            .map(|s| (s.sentence.clone(), s.translation.clone()))
            .unwrap_or_default();

        let correct_answer = target.word.trim().to_string();
        let mut options = Vec::with_capacity(distractors.len() + 1);
        options.push(correct_answer.clone());
        options.extend(distractors);
        options.shuffle(rng);

        quiz.questions.push(QuizQuestion {
            image_path: Some(image_path.to_string()),
            bounding_box: target.bounding_box.clone(),
            word: correct_answer.clone(),
            meaning: target.meaning.clone(),
            example_sentence,
            example_translation,
            correct_answer,
            options,
            photo_id: target.photo_id,
        });
        quiz.word_map.insert(key, target.id);
    }

    log_info!(
        "Generated {} questions from {} eligible word objects ({} words) in {}ms",
        quiz.questions.len(),
        eligible.len(),
        entries.len(),
        started.elapsed().as_millis()
    );

    quiz
}

/// Word objects that can be shown: a non-blank word with a resolved meaning,
/// a known photo and an image file on this device.
fn eligible_word_objects<'a>(
    word_objects: &'a [WordObject],
    photos: &HashMap<i64, &Photo>,
    files: &dyn FileProbe,
) -> Vec<&'a WordObject> {
    let mut image_present: HashMap<i64, bool> = HashMap::new();

    word_objects
        .iter()
        .filter(|object| !object.word.trim().is_empty() && object.has_resolved_meaning())
        .filter(|object| {
            *image_present.entry(object.photo_id).or_insert_with(|| {
                photos
                    .get(&object.photo_id)
                    .and_then(|photo| photo.local_path())
                    .map(|path| files.file_exists(path))
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// Groups sightings by lower-cased word, keeping first-seen order.
pub fn group_by_word<'a>(objects: impl IntoIterator<Item = &'a WordObject>) -> Vec<VocabularyEntry<'a>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<VocabularyEntry<'a>> = Vec::new();

    for object in objects {
        let key = object.key();
        match index.get(&key) {
            Some(&position) => entries[position].members.push(object),
            None => {
                index.insert(key.clone(), entries.len());
                entries.push(VocabularyEntry {
                    key,
                    members: vec![object],
                });
            }
        }
    }

    entries
}

/// One representative per word, never-studied first, then oldest first.
pub fn select_cohort<'a>(entries: &[VocabularyEntry<'a>], cohort_size: usize) -> Vec<&'a WordObject> {
    let mut representatives: Vec<&'a WordObject> = entries
        .iter()
        .filter_map(VocabularyEntry::representative)
        .collect();
    representatives.sort_by_key(|o| o.last_studied);
    representatives.truncate(cohort_size);
    representatives
}

/// One spelling per word (its first sighting), skipping blank words.
fn spellings<'a>(entries: &'a [VocabularyEntry<'_>]) -> Vec<(&'a str, &'a str)> {
    entries
        .iter()
        .filter_map(|entry| {
            let word = entry.members.first()?.word.trim();
            (!word.is_empty()).then_some((entry.key.as_str(), word))
        })
        .collect()
}

/// Where wrong options come from, as `(key, spelling)` pairs.
struct DistractorPools<'a> {
    /// Words that could themselves be asked about.
    eligible: &'a [(&'a str, &'a str)],
    /// Every stored word, used only when no eligible word is left.
    stored: &'a [(&'a str, &'a str)],
    words_by_photo: &'a HashMap<i64, HashSet<String>>,
}

impl DistractorPools<'_> {
    /// Up to `count` other words, preferring ones not visible in the same
    /// photo; an empty result means the question cannot be asked.
    fn pick<R>(&self, target: &WordObject, count: usize, rng: &mut R) -> Vec<String>
    where
        R: Rng + ?Sized,
    {
        let target_key = target.key();
        let same_photo = self.words_by_photo.get(&target.photo_id);
        let others = |pool: &[(&str, &str)]| -> Vec<String> {
            pool.iter()
                .filter(|(key, _)| *key != target_key)
                .map(|(_, word)| word.to_string())
                .collect()
        };

        let mut candidates: Vec<String> = self
            .eligible
            .iter()
            .filter(|(key, _)| *key != target_key)
            .filter(|(key, _)| same_photo.map_or(true, |words| !words.contains(*key)))
            .map(|(_, word)| word.to_string())
            .collect();

        if candidates.len() < count {
            candidates = others(self.eligible);
        }
        if candidates.is_empty() {
            candidates = others(self.stored);
        }

        candidates.shuffle(rng);
        candidates.truncate(count);
        candidates
    }
}

/// A random example from the first sighting of the word that has any,
/// starting with `target` itself.
fn pick_example<'a, R>(
    target: &WordObject,
    members: &[&WordObject],
    sentences_by_object: &HashMap<i64, Vec<&'a ExampleSentence>>,
    rng: &mut R,
) -> Option<&'a ExampleSentence>
where
    R: Rng + ?Sized,
{
    let others = members.iter().filter(|o| o.id != target.id).map(|o| o.id);

    std::iter::once(target.id)
        .chain(others)
        .filter_map(|id| sentences_by_object.get(&id))
        .find(|sentences| !sentences.is_empty())
        .and_then(|sentences| sentences.choose(rng).copied())
}
