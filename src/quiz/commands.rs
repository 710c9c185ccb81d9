use crate::{
    quiz::{AnswerOutcome, QuizController, QuizProgress, QuizQuestion},
    AppState,
};

fn controller_from_state(state: &AppState) -> QuizController {
    state.quiz.clone()
}

pub async fn start_quiz(state: &AppState) -> Result<QuizProgress, String> {
    let config = state.settings.quiz_config();
    let controller = controller_from_state(state);
    controller
        .start_session(config)
        .await
        .map_err(|e| e.to_string())
}

pub async fn next_question(state: &AppState) -> Result<Option<QuizQuestion>, String> {
    let controller = controller_from_state(state);
    Ok(controller.next_question().await)
}

pub async fn submit_answer(state: &AppState, answer: String) -> Result<AnswerOutcome, String> {
    let controller = controller_from_state(state);
    controller
        .submit_answer(&answer)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_quiz_progress(state: &AppState) -> Result<QuizProgress, String> {
    let controller = controller_from_state(state);
    Ok(controller.progress().await)
}

pub async fn end_quiz(state: &AppState) -> Result<QuizProgress, String> {
    let controller = controller_from_state(state);
    controller.end_session().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewPhoto, NewWordObject};

    #[tokio::test]
    async fn quiz_runs_end_to_end_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).unwrap();

        let mut images = Vec::new();
        for (word, meaning) in [("apple", "사과"), ("banana", "바나나")] {
            let image = dir.path().join(format!("{word}.jpg"));
            std::fs::write(&image, b"jpeg").unwrap();
            let photo = state
                .db
                .insert_photo(&NewPhoto::local(image.to_string_lossy()))
                .await
                .unwrap();
            state
                .db
                .insert_word_object(&NewWordObject {
                    photo_id: photo.id,
                    word: word.to_string(),
                    meaning: meaning.to_string(),
                    bounding_box: Some("0.1,0.1,0.9,0.9".to_string()),
                })
                .await
                .unwrap();
            images.push(image);
        }
        // banana's image is gone: only apple is asked, banana stays an option.
        std::fs::remove_file(&images[1]).unwrap();

        let progress = start_quiz(&state).await.unwrap();
        assert_eq!(progress.total, 1);

        let question = next_question(&state).await.unwrap().unwrap();
        assert_eq!(question.word, "apple");
        assert_eq!(question.meaning, "사과");
        let mut options = question.options.clone();
        options.sort();
        assert_eq!(options, vec!["apple", "banana"]);

        let outcome = submit_answer(&state, "Apple".into()).await.unwrap();
        assert!(outcome.correct);
        assert!(outcome.progress.is_complete);
        assert!(next_question(&state).await.unwrap().is_none());

        end_quiz(&state).await.unwrap();
        let apple = state.db.get_word_objects_by_word("apple").await.unwrap();
        assert!(apple[0].last_studied > 0);
        let banana = state.db.get_word_objects_by_word("banana").await.unwrap();
        assert_eq!(banana[0].last_studied, 0);
    }

    #[tokio::test]
    async fn submitting_before_starting_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).unwrap();

        assert!(submit_answer(&state, "apple".into()).await.is_err());
        let progress = get_quiz_progress(&state).await.unwrap();
        assert_eq!(progress.total, 0);
    }
}
