//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use topshelf::core::{default_output_file_name, make_filename};
    use topshelf::utils::url::Url;

    fn first_url() -> Url {
        Url::parse("http://example.com/book/my-story").unwrap()
    }

    #[test]
    fn author_and_title() {
        let file_name =
            default_output_file_name(Some("Jane Doe"), Some("The Story"), &first_url());

        assert_eq!(file_name, "Jane_Doe-The_Story.epub");
    }

    #[test]
    fn title_only() {
        let file_name = default_output_file_name(None, Some("The Story"), &first_url());

        assert_eq!(file_name, "The_Story.epub");
    }

    #[test]
    fn url_stands_in_for_title() {
        let file_name = default_output_file_name(Some("Jane"), Some("?!"), &first_url());

        assert_eq!(file_name, "Jane-my-story.epub");
    }

    #[test]
    fn nothing_known() {
        let url = Url::parse("http://example.com/").unwrap();
        let file_name = default_output_file_name(None, None, &url);

        assert_eq!(file_name, "book.epub");
    }

    #[test]
    fn sanitize() {
        assert_eq!(make_filename(r#"/\<>:"|? Title"#), "Title");
        assert_eq!(make_filename("Tom & Jerry"), "Tom_Jerry");
        assert_eq!(make_filename("Élodie's Book"), "Élodie_s_Book");
    }
}
