use std::sync::Arc;
use warp::Filter;

use crate::room_manager::RoomManager;

pub mod config;
pub mod providers;
pub mod room_manager;
pub mod session;
pub mod storage;
pub mod websocket;

pub fn create_routes(
    rooms: Arc<RoomManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let rooms_filter = warp::any().map(move || rooms.clone());

    // WebSocket endpoint, one room per path segment
    let party = warp::path!("party" / String)
        .and(warp::ws())
        .and(rooms_filter)
        .map(|room_id: String, ws: warp::ws::Ws, rooms: Arc<RoomManager>| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, room_id, rooms))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET"]);

    party.or(health).with(cors).with(warp::log("rhyme_rooms"))
}
