use utoipa::OpenApi;

use crate::features;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::competitions::handlers::create_competition,
        features::competitions::handlers::list_competitions_for_voting,
        features::competitions::handlers::list_my_competitions,
        features::competitions::handlers::get_competition,
        features::competitions::handlers::toggle_competition_status,
        features::competitions::handlers::deactivate_competition,
        features::votes::handlers::submit_vote,
        features::votes::handlers::list_competition_votes,
        features::votes::handlers::has_voted,
        features::votes::handlers::get_vote,
        features::stats::handlers::get_counts,
        features::events::handlers::stream_events,
    ),
    components(
        schemas(
            storage::dto::CreateCompetitionRequest,
            storage::dto::SubmitVoteRequest,
            storage::dto::HasVotedResponse,
            storage::models::Competition,
            storage::models::Vote,
            storage::models::Counts,
            storage::RegistryEvent,
        )
    ),
    tags(
        (name = "competitions", description = "Competition lifecycle endpoints"),
        (name = "votes", description = "Vote submission and lookup"),
        (name = "admin", description = "Registry owner endpoints"),
        (name = "stats", description = "Registry totals"),
        (name = "events", description = "Live registry event stream"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for path in [
            "/api/competitions",
            "/api/competitions/voting",
            "/api/competitions/mine",
            "/api/competitions/{id}",
            "/api/competitions/{id}/toggle",
            "/api/competitions/{id}/deactivate",
            "/api/competitions/{id}/votes",
            "/api/competitions/{id}/has-voted",
            "/api/votes/{id}",
            "/api/stats/counts",
            "/api/events",
        ] {
            assert!(paths.iter().any(|p| p == path), "missing {path}");
        }
    }

    #[test]
    fn test_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
