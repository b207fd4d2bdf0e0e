/*!
 * Request extractors
 *
 * - CurrentPrincipal: the authenticated principal placed in the SecurityContext
 *   by the auth middleware
 */
mod principal;

pub use principal::CurrentPrincipal;
