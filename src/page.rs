use maud::{html, Markup, DOCTYPE};

use crate::types::Book;

pub const TITLE: &str = "LMS APIs";
pub const SUMMARY: &str = "Library management";

const ENDPOINTS: &[(&str, &str, &str)] = &[
	("POST", "/books/", "Create a new book"),
	("GET", "/books/?author=&publication_year=", "Search books by author or publication year"),
	("GET", "/allbooks/", "Read all the books"),
	("PUT", "/books/{book_id}", "Update the book"),
	("DELETE", "/books/{book_id}", "Delete the book"),
	("POST", "/reviews/{book_id}", "Create a review for a book"),
	("GET", "/reviews/{book_id}", "Read all the reviews of a book"),
	("PUT", "/reviews/{book_id}/{review_id}", "Update a review of a book"),
	("DELETE", "/reviews/{book_id}/{review_id}", "Delete a review of a book"),
];

pub fn index(books: &[Book]) -> Markup {
	html! {
		(DOCTYPE)
		html {
			head { title { (TITLE) } }
			body {
				h1 { (TITLE) " " small { (env!("CARGO_PKG_VERSION")) } }
				p { b { (SUMMARY) } }

				h2 { "Endpoints" }
				table {
					thead{ tr {
						th { "Method" }
						th { "Path" }
						th { "Summary" }
					} }
					tbody {
						@for (method, path, summary) in ENDPOINTS {
							tr {
								td { (method) }
								td { code { (path) } }
								td { (summary) }
							}
						}
					}
				}

				h2 { "Books" }
				@if books.is_empty() {
					p { "No books yet." }
				} @else {
					table {
						thead{ tr {
							th { "Id" }
							th { "Title" }
							th { "Author" }
							th { "Published" }
						} }
						tbody {
							@for book in books {
								tr {
									th { (book.id) }
									td { (book.title) }
									td { (book.author) }
									td { (book.publication_year) }
								}
							}
						}
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lists_books_and_escapes_titles() {
		let books = vec![Book{
			id: 3,
			title: "<Dune>".to_string(),
			author: "Herbert".to_string(),
			publication_year: 1965,
		}];
		let page = index(&books).into_string();
		assert!(page.contains(TITLE));
		assert!(page.contains("&lt;Dune&gt;"));
		assert!(page.contains("1965"));
		assert!(!page.contains("No books yet."));
	}

	#[test]
	fn empty_catalog() {
		assert!(index(&[]).into_string().contains("No books yet."));
	}
}
