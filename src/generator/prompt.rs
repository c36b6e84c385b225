use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION: &str = "60 minutes";
pub const DEFAULT_DESCRIPTION: &str = "60 minutes zone2";
pub const DEFAULT_GENRES: &str = "Rock, metal, blues";

/// What the runner asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRequest {
    pub duration: String,
    pub description: String,
    pub genres: String,
}

impl Default for PlaylistRequest {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            genres: DEFAULT_GENRES.to_string(),
        }
    }
}

const ZONE_GUIDE: &str = "\
How to pick music for each training zone:
Zone1 (very low intensity, holding back): steady, mellow, consistent tempo with no sudden changes.
Zone2 (conversational pace, run by feel): consistent, driving but not overwhelming energy that supports a steady stride.
Zone X (moderate rut between Zone2 and Zone3, overlaps marathon effort): moderately hard, consistent push.
Zone3 (lactate threshold, comfortably hard): strong, energetic tempo with urgency that still feels relaxed.
Zone Y (gap between threshold and intervals): slightly elevated, transitional intensity short of peak effort.
Zone4 (hard intervals): very high energy with a strong driving beat.
Zone5 (maximal efforts and sprints): extremely high energy, very fast tempo, explosive sections.";

/// Render the model prompt for a training session.
///
/// The output format line matters: the response is parsed as
/// `Artist,Song;Artist,Song;`.
pub fn build_prompt(request: &PlaylistRequest) -> String {
    format!(
        "Create a running training playlist with a total duration of {duration}.\n\
         Training session breakdown:\n{description}\n\
         Music preferences:\nGenres: {genres}.\n\
         Explicit content: avoid songs with explicit lyrics.\n\
         The total playlist duration should be as close as possible to the requested duration.\n\
         {guide}\n\
         Output format:\n\
         Do not include any conversational text, explanations or extra characters. \
         Respond with a single continuous string of songs in the format: \
         Artist,Song;Artist,Song;Artist,Song;",
        duration = request.duration.trim(),
        description = request.description.trim(),
        genres = request.genres.trim(),
        guide = ZONE_GUIDE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_request_fields() {
        let request = PlaylistRequest {
            duration: "45 minutes".to_string(),
            description: "10 min zone1, 30 min zone3, 5 min zone1".to_string(),
            genres: "Punk, grunge".to_string(),
        };

        let prompt = build_prompt(&request);

        assert!(prompt.contains("total duration of 45 minutes"));
        assert!(prompt.contains("10 min zone1, 30 min zone3, 5 min zone1"));
        assert!(prompt.contains("Genres: Punk, grunge."));
        assert!(prompt.contains("Zone3"));
        assert!(prompt.ends_with("Artist,Song;Artist,Song;Artist,Song;"));
    }

    #[test]
    fn test_default_request() {
        let request = PlaylistRequest::default();
        assert_eq!(request.duration, "60 minutes");
        assert_eq!(request.description, "60 minutes zone2");
        assert_eq!(request.genres, "Rock, metal, blues");
    }
}
